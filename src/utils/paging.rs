pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Normalizes client paging values. `$limit` rejects non-positive
/// arguments and `$skip` rejects negatives, so zero or negative inputs
/// collapse to the defaults instead of surfacing a pipeline error.
pub fn page_params(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = match limit {
        Some(l) if l > 0 => l,
        _ => DEFAULT_PAGE_SIZE,
    };
    let offset = match offset {
        Some(o) if o > 0 => o,
        _ => 0,
    };
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        assert_eq!(page_params(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_params(Some(25), Some(50)), (25, 50));
    }

    #[test]
    fn test_page_params_rejects_non_positive_limit() {
        assert_eq!(page_params(Some(0), None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_params(Some(-5), None), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_page_params_rejects_negative_offset() {
        assert_eq!(page_params(Some(10), Some(-3)), (10, 0));
    }
}
