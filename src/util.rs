pub fn percentage(part: usize, total: usize) -> Option<f64> {
    match total {
        positive if positive > 0 => Some(((part as f64 / total as f64) * 100.0).round()),
        _ => None,
    }
}

/// Fraction of a phase completed once the item at `position` is on screen.
pub fn progress_ratio(position: usize, total: usize) -> f64 {
    match total {
        0 => 0.0,
        _ => ((position + 1) as f64 / total as f64).min(1.0),
    }
}
