/// Whether feedback should be shown for `count` against `limit`.
///
/// A zero threshold shows feedback from the first keystroke. Otherwise the
/// boundary is inclusive: at exactly `threshold_percent` of the limit the
/// feedback is visible.
pub fn is_visible(count: usize, limit: u32, threshold_percent: u8) -> bool {
    if threshold_percent == 0 {
        return true;
    }
    (count as u64) * 100 >= u64::from(limit) * u64::from(threshold_percent)
}
