use super::*;
use crate::fixtures::{event, ids};
use shared::domain::Severity;

fn mixed_records() -> Vec<QualityEvent> {
    vec![
        event(1, Severity::Low, Some("2025-03-10T09:00")),
        event(2, Severity::Critical, None),
        event(3, Severity::High, Some("2025-01-05T12:30")),
        event(4, Severity::Medium, None),
        event(5, Severity::High, Some("2025-02-01T08:00")),
    ]
}

#[test]
fn none_preserves_source_order() {
    let records = mixed_records();
    assert_eq!(ids(&sorted(&records, SortSpec::None)), vec![1, 2, 3, 4, 5]);
}

#[test]
fn due_ascending_places_missing_dates_last() {
    let records = mixed_records();
    let view = sorted(&records, SortSpec::DueAsc);
    assert_eq!(ids(&view), vec![3, 5, 1, 2, 4]);

    let dated: Vec<_> = view.iter().filter_map(|event| event.due_date).collect();
    assert!(dated.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn due_descending_also_places_missing_dates_last() {
    let records = mixed_records();
    let view = sorted(&records, SortSpec::DueDesc);
    assert_eq!(ids(&view), vec![1, 5, 3, 2, 4]);

    let first_missing = view
        .iter()
        .position(|event| event.due_date.is_none())
        .expect("missing dates present");
    assert!(view[first_missing..].iter().all(|event| event.due_date.is_none()));
}

#[test]
fn severity_orders_by_label_text_not_rank() {
    let records = mixed_records();
    assert_eq!(
        ids(&sorted(&records, SortSpec::SeverityAsc)),
        vec![2, 3, 5, 1, 4]
    );
    assert_eq!(
        ids(&sorted(&records, SortSpec::SeverityDesc)),
        vec![4, 1, 3, 5, 2]
    );
}

#[test]
fn equal_keys_keep_source_order() {
    let records = vec![
        event(10, Severity::High, None),
        event(11, Severity::Low, None),
        event(12, Severity::High, None),
    ];
    assert_eq!(ids(&sorted(&records, SortSpec::DueAsc)), vec![10, 11, 12]);
    assert_eq!(ids(&sorted(&records, SortSpec::DueDesc)), vec![10, 11, 12]);
    assert_eq!(
        ids(&sorted(&records, SortSpec::SeverityAsc)),
        vec![10, 12, 11]
    );
}

#[test]
fn sorting_never_mutates_input() {
    let records = mixed_records();
    let snapshot = records.clone();

    let first = ids(&sorted(&records, SortSpec::DueDesc));
    let second = ids(&sorted(&records, SortSpec::DueDesc));

    assert_eq!(first, second);
    assert_eq!(records, snapshot);
}

#[test]
fn parses_sort_labels() {
    assert_eq!("".parse::<SortSpec>(), Ok(SortSpec::None));
    assert_eq!("due_asc".parse::<SortSpec>(), Ok(SortSpec::DueAsc));
    assert_eq!("sev_desc".parse::<SortSpec>(), Ok(SortSpec::SeverityDesc));
    assert!("priority".parse::<SortSpec>().is_err());
}
