use std::io::Write;

/// Width of the bar in characters.
const WIDTH: f64 = 50.0;

/// Receives completion updates while cmd files are parsed. Updates may
/// arrive from any worker thread.
pub trait Progress: Sync {
    /// `done` of `total` files have been parsed.
    fn update(&self, done: usize, total: usize);

    /// All work has finished.
    fn finish(&self) {}
}

/// Draws a textual progress bar on stdout.
pub struct Bar;

impl Bar {
    fn render(fraction: f64) -> String {
        let filled = (WIDTH * fraction) as usize;
        let empty = (WIDTH * (1.0 - fraction)) as usize;
        format!(
            "[{}{}] {:.1}%",
            "|".repeat(filled),
            "-".repeat(empty),
            fraction * 100.0
        )
    }
}

impl Progress for Bar {
    fn update(&self, done: usize, total: usize) {
        let fraction = if total == 0 {
            1.0
        } else {
            done as f64 / total as f64
        };
        let mut out = std::io::stdout().lock();
        // best effort
        let _ = write!(out, "\r {}\r", Self::render(fraction));
        let _ = out.flush();
    }

    fn finish(&self) {
        println!();
    }
}

/// Discards all updates.
#[cfg(test)]
pub struct Silent;

#[cfg(test)]
impl Progress for Silent {
    fn update(&self, _done: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty() {
        assert_eq!(Bar::render(0.0), format!("[{}] 0.0%", "-".repeat(50)));
    }

    #[test]
    fn render_full() {
        assert_eq!(Bar::render(1.0), format!("[{}] 100.0%", "|".repeat(50)));
    }

    #[test]
    fn render_partial() {
        let s = Bar::render(0.25);
        assert!(s.starts_with(&format!("[{}-", "|".repeat(12))));
        assert!(s.ends_with("] 25.0%"));
    }
}
