use accesslens_types::LogRow;

/// One page of an ordered row set
#[derive(Debug)]
pub struct Page<'a> {
    pub rows: &'a [LogRow],

    /// 1-based page number after clamping
    pub number: usize,

    pub total_pages: usize,

    pub total_rows: usize,
}

/// Total pages for `total_rows`, never less than one
pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    total_rows.div_ceil(page_size.max(1)).max(1)
}

/// Slice out page `page` (1-based). Out-of-range requests clamp to the
/// nearest valid page; a zero page size is treated as one.
pub fn paginate(rows: &[LogRow], page_size: usize, page: usize) -> Page<'_> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(rows.len(), page_size);
    let number = page.clamp(1, total_pages);

    let start = ((number - 1) * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());

    Page {
        rows: &rows[start..end],
        number,
        total_pages,
        total_rows: rows.len(),
    }
}
