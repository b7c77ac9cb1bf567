//! Discrete font sizes for titles and bullet lists.
//!
//! Sizes are picked from a few fixed steps so that neighbouring slides look alike. More content
//! never gets a larger size.

/// Title size in points for `title`, by trimmed character count.
pub fn title_font_size(title: &str) -> f32 {
    match title.trim().chars().count() {
        n if n > 90 => 24.0,
        n if n > 70 => 26.0,
        n if n > 52 => 30.0,
        _ => 33.0,
    }
}

/// Shape of a bullet list, in characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyMetrics {
    /// Number of bullets.
    pub count: usize,
    /// Longest bullet.
    pub max_len: usize,
    /// All bullets together.
    pub total_len: usize,
}

impl BodyMetrics {
    /// Count and lengths of `bullets`, in characters.
    pub fn measure<S: AsRef<str>>(bullets: &[S]) -> Self {
        bullets.iter().fold(Self::default(), |acc, b| {
            let len = b.as_ref().chars().count();
            Self {
                count: acc.count + 1,
                max_len: acc.max_len.max(len),
                total_len: acc.total_len + len,
            }
        })
    }
}

/// Body size in points for a bullet list.
pub fn body_font_size<S: AsRef<str>>(bullets: &[S]) -> f32 {
    let m = BodyMetrics::measure(bullets);
    if m.count >= 5 || m.max_len > 210 || m.total_len > 680 {
        16.0
    } else if m.count >= 4 || m.max_len > 170 || m.total_len > 520 {
        18.0
    } else {
        19.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fonts.rs"]
mod tests;
