//! Page-type inference from module names.
//!
//! Rules are evaluated in the order of [`RULES`] and the first match wins, so a
//! name like "Task List Detail" is a list page. Reordering the table changes
//! results.

use uiwalk_core::PageType;

/// One ordered keyword rule.
struct PageTypeRule {
    keywords: &'static [&'static str],
    page_type: PageType,
}

const RULES: &[PageTypeRule] = &[
    PageTypeRule {
        keywords: &["列表", "list"],
        page_type: PageType::List,
    },
    PageTypeRule {
        keywords: &["详情", "detail", "details"],
        page_type: PageType::Detail,
    },
    PageTypeRule {
        keywords: &["新建", "创建", "新增", "create", "new", "add"],
        page_type: PageType::Create,
    },
    PageTypeRule {
        keywords: &["编辑", "修改", "edit", "modify", "update"],
        page_type: PageType::Edit,
    },
    PageTypeRule {
        keywords: &["弹窗", "对话框", "dialog", "modal", "popup"],
        page_type: PageType::Dialog,
    },
];

/// Infer the page type of a module from its name.
pub fn infer_page_type(name: &str) -> PageType {
    let lowered = name.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| contains_keyword(&lowered, kw)))
        .map_or(PageType::Unknown, |rule| rule.page_type.clone())
}

/// Keyword test shared by the recognizers. CJK keywords match as substrings;
/// ASCII keywords must be whole words. `haystack` is expected lowercased.
pub(crate) fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.is_ascii() {
        haystack
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == keyword)
    } else {
        haystack.contains(keyword)
    }
}
