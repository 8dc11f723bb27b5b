use std::io::Write;

use deepdata_core::Progress;

const WIDTH: usize = 30;

/// Text progress bar on stderr, redrawn only when the percentage changes.
#[derive(Debug, Default)]
pub struct ProgressBar {
    percent: Option<usize>,
}

impl ProgressBar {
    fn render(percent: usize) -> String {
        let filled = WIDTH * percent / 100;
        format!(
            "\r[{}{}] {percent:>3}%",
            "=".repeat(filled),
            " ".repeat(WIDTH - filled)
        )
    }
}

impl Progress for ProgressBar {
    fn update(&mut self, processed: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (processed.min(total) * 100) / total
        };
        if self.percent == Some(percent) {
            return;
        }
        self.percent = Some(percent);

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", Self::render(percent));
        if percent == 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_bar_and_percentage() {
        assert_eq!(ProgressBar::render(0), format!("\r[{}]   0%", " ".repeat(30)));
        assert_eq!(
            ProgressBar::render(50),
            format!("\r[{}{}]  50%", "=".repeat(15), " ".repeat(15))
        );
        assert_eq!(ProgressBar::render(100), format!("\r[{}] 100%", "=".repeat(30)));
    }

    #[test]
    fn should_only_track_percentage_changes() {
        let mut bar = ProgressBar::default();

        bar.update(1, 1000);
        assert_eq!(bar.percent, Some(0));
        bar.update(505, 1000);
        assert_eq!(bar.percent, Some(50));
        bar.update(0, 0);
        assert_eq!(bar.percent, Some(100));
    }
}
