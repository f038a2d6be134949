//! Terminal progress display for generation runs.

use crate::coordinator::GenerationObserver;
use crate::generator::CaseBatch;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Progress bars for a generation run: one bar over modules and a spinner
/// with running token and fallback totals.
pub struct GenerationProgress {
    module_bar: ProgressBar,
    usage_bar: ProgressBar,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    fallbacks: AtomicUsize,
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProgress {
    pub fn new() -> Self {
        Self::with_multi(&MultiProgress::new())
    }

    /// Draw the bars in `multi`, typically the one the log writer suspends.
    pub fn with_multi(multi: &MultiProgress) -> Self {
        let module_bar = multi.add(ProgressBar::new(0));
        module_bar.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("##-"),
        );
        module_bar.set_prefix("Modules");

        let usage_bar = multi.add(ProgressBar::new_spinner());
        usage_bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .expect("valid template"),
        );

        Self {
            module_bar,
            usage_bar,
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    /// Finish all bars.
    pub fn finish(&self) {
        self.module_bar.finish_and_clear();
        self.usage_bar.finish_and_clear();
    }
}

impl GenerationObserver for GenerationProgress {
    fn on_start(&self, modules: usize) {
        self.module_bar.set_length(modules as u64);
        self.module_bar.set_position(0);
    }

    fn on_module_done(&self, batch: &CaseBatch) {
        let input = self
            .input_tokens
            .fetch_add(batch.input_tokens.unwrap_or(0), Ordering::Relaxed)
            + batch.input_tokens.unwrap_or(0);
        let output = self
            .output_tokens
            .fetch_add(batch.output_tokens.unwrap_or(0), Ordering::Relaxed)
            + batch.output_tokens.unwrap_or(0);
        let fallbacks =
            self.fallbacks.fetch_add(usize::from(batch.is_fallback()), Ordering::Relaxed)
                + usize::from(batch.is_fallback());

        self.module_bar.set_message(batch.module.clone());
        self.module_bar.inc(1);
        self.usage_bar.set_message(format!(
            "{input} input / {output} output tokens, {fallbacks} template fallback(s)"
        ));
        self.usage_bar.tick();
    }

    fn on_finish(&self) {
        self.finish();
    }
}

/// Stderr writer for one log event. The event is buffered and written with
/// the bars of `multi` suspended, so lines from worker threads never tear
/// through a redraw.
///
/// Passed to `tracing_subscriber::fmt().with_writer(..)` as a closure that
/// builds one writer per event.
pub struct SuspendedStderr {
    multi: MultiProgress,
    buf: Vec<u8>,
}

impl SuspendedStderr {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            buf: Vec::new(),
        }
    }
}

impl Write for SuspendedStderr {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SuspendedStderr {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.buf);
        self.multi.suspend(|| {
            let _ = io::stderr().write_all(&buf);
        });
    }
}
