//! Vendor queue derivation
//!
//! Sections are a pure function of status; nothing here is cached. Callers
//! pass in the vendor's active sub-orders as read from the store.

use shared::order::{QueueSection, SectionCounts, SubOrder};
use shared::types::Pagination;

/// Half-open `[start, end)` window of `created_at` millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Filters of `list_section`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionFilter {
    pub section: QueueSection,
    pub date: Option<DateRange>,
    pub page: u32,
    pub limit: u32,
}

impl Default for SectionFilter {
    fn default() -> Self {
        Self {
            section: QueueSection::Upcoming,
            date: None,
            page: 1,
            limit: 20,
        }
    }
}

/// One page of a section plus the live counts
#[derive(Debug, Clone)]
pub struct SectionPage {
    pub orders: Vec<SubOrder>,
    pub pagination: Pagination,
    pub section_counts: SectionCounts,
}

/// Count active sub-orders per section
pub fn section_counts(orders: &[SubOrder]) -> SectionCounts {
    let mut counts = SectionCounts::default();
    for order in orders {
        counts.add(order.status);
    }
    counts
}

/// Next free position in the vendor's accepted/preparing bucket
///
/// `max + 1`, so positions stay unique but may have gaps once orders leave
/// the bucket.
pub fn next_queue_position(orders: &[SubOrder]) -> u32 {
    orders
        .iter()
        .filter(|o| o.status.holds_queue_position())
        .filter_map(|o| o.queue_position)
        .max()
        .unwrap_or(0)
        + 1
}

/// Select, sort and paginate one section
///
/// `queue` is ordered by queue position, `upcoming` by arrival and `ready`
/// by the time the order became ready.
pub fn list_section(orders: Vec<SubOrder>, filter: &SectionFilter) -> SectionPage {
    let section_counts = section_counts(&orders);

    let mut selected: Vec<SubOrder> = orders
        .into_iter()
        .filter(|o| o.status.section() == Some(filter.section))
        .filter(|o| filter.date.is_none_or(|range| range.contains(o.created_at)))
        .collect();

    match filter.section {
        QueueSection::Queue => selected.sort_by(|a, b| {
            a.queue_position
                .unwrap_or(u32::MAX)
                .cmp(&b.queue_position.unwrap_or(u32::MAX))
                .then(a.created_at.cmp(&b.created_at))
        }),
        QueueSection::Upcoming => selected.sort_by_key(|o| o.created_at),
        QueueSection::Ready => {
            selected.sort_by_key(|o| (o.ready_at.unwrap_or(o.created_at), o.created_at))
        }
    }

    let pagination = Pagination::new(filter.page, filter.limit, selected.len() as u64);
    let orders = selected
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit as usize)
        .collect();

    SectionPage {
        orders,
        pagination,
        section_counts,
    }
}
