//! One sheet per module, the layout of the walk-through workbook.

use crate::csv::export_rows;
use std::collections::HashSet;
use uiwalk_core::TestCase;

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const RESERVED_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Cases of one module, in their original order.
#[derive(Debug, Clone)]
pub struct ModuleGroup<'a> {
    pub module: &'a str,
    pub cases: Vec<&'a TestCase>,
}

/// Group cases by module in first-appearance order.
pub fn group_by_module(cases: &[TestCase]) -> Vec<ModuleGroup<'_>> {
    let mut groups: Vec<ModuleGroup<'_>> = Vec::new();
    for case in cases {
        match groups.iter_mut().find(|g| g.module == case.module) {
            Some(group) => group.cases.push(case),
            None => groups.push(ModuleGroup {
                module: &case.module,
                cases: vec![case],
            }),
        }
    }
    groups
}

/// Sheet name for a module: reserved characters replaced with `_`, then the
/// first 31 characters.
pub fn sheet_name(module: &str) -> String {
    let cleaned: String = module
        .trim()
        .chars()
        .map(|c| if RESERVED_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        "未分类".to_string()
    } else {
        cleaned
    }
}

/// Sheet names for `modules`, made unique by a `~n` suffix where truncation
/// collides. Suffixed names still respect the length limit.
pub fn unique_sheet_names(modules: &[&str]) -> Vec<String> {
    let mut used = HashSet::new();
    modules
        .iter()
        .map(|module| {
            let base = sheet_name(module);
            if used.insert(base.clone()) {
                return base;
            }
            let mut n = 2;
            loop {
                let suffix = format!("~{n}");
                let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
                let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
                if used.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

/// One module's sheet rendered as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub module: String,
    pub case_count: usize,
    pub csv: String,
}

/// Render each module's cases as its own CSV sheet.
pub fn split_by_module(cases: &[TestCase]) -> Vec<Sheet> {
    let groups = group_by_module(cases);
    let modules: Vec<&str> = groups.iter().map(|g| g.module).collect();
    let names = unique_sheet_names(&modules);
    groups
        .into_iter()
        .zip(names)
        .map(|(group, name)| Sheet {
            name,
            module: group.module.to_string(),
            case_count: group.cases.len(),
            csv: export_rows(group.cases),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiwalk_core::{DesignPrinciple, Priority};

    fn case(module: &str) -> TestCase {
        TestCase::new(
            module,
            "标题",
            DesignPrinciple::VisualConsistency,
            "检查标题",
            Priority::High,
            "16px",
        )
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let cases = vec![case("B"), case("A"), case("B")];
        let groups = group_by_module(&cases);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].module, "B");
        assert_eq!(groups[0].cases.len(), 2);
        assert_eq!(groups[1].module, "A");
    }

    #[test]
    fn test_sheet_name_rules() {
        let long = "一".repeat(40);
        assert_eq!(sheet_name(&long).chars().count(), 31);
        assert_eq!(sheet_name("Upstream/Downstream"), "Upstream_Downstream");
        assert_eq!(sheet_name("  "), "未分类");
    }

    #[test]
    fn test_colliding_names_get_suffix() {
        let a = format!("{}A", "页".repeat(31));
        let b = format!("{}B", "页".repeat(31));
        let names = unique_sheet_names(&[a.as_str(), b.as_str()]);
        assert_eq!(names[0], "页".repeat(31));
        assert_eq!(names[1], format!("{}~2", "页".repeat(29)));
        assert_eq!(names[1].chars().count(), 31);
    }

    #[test]
    fn test_split_renders_each_module() {
        let cases = vec![case("首页"), case("设置"), case("首页")];
        let sheets = split_by_module(&cases);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].case_count, 2);
        assert_eq!(sheets[0].csv.lines().count(), 3);
        assert!(sheets[1].csv.contains("设置"));
    }
}
