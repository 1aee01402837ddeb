use contracts::dashboards::d100_warranty_dashboard::{
    DashboardResponse, FilterState, RecordView, Stats,
};
use contracts::domain::a001_warranty_record::WarrantyRecord;

/// Магазины по умолчанию, если в данных нет ни одного
pub const DEFAULT_STORES: &[&str] = &["K24 Central", "K24 Norte", "K24 Sur", "K24 Este"];

/// Записи, проходящие все заданные фильтры (логическое И), в исходном порядке
pub fn filter_records(records: &[WarrantyRecord], filters: &FilterState) -> Vec<WarrantyRecord> {
    let start = filters.start_date.trim();
    let end = filters.end_date.trim();
    let store = filters.store.trim();
    let query = filters.query.trim().to_lowercase();
    let status = filters.status_filter();

    records
        .iter()
        .filter(|r| start.is_empty() || r.intake_date.as_str() >= start)
        .filter(|r| end.is_empty() || r.intake_date.as_str() <= end)
        .filter(|r| store.is_empty() || r.store == store)
        .filter(|r| status.map_or(true, |s| r.status() == s))
        .filter(|r| match filters.view {
            RecordView::All => true,
            RecordView::Active => !r.archived,
            RecordView::History => r.archived,
        })
        .filter(|r| {
            query.is_empty()
                || r.device_name.to_lowercase().contains(&query)
                || r.device_brand.to_lowercase().contains(&query)
                || r.defective_imei.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Список магазинов по всем загруженным записям (не только отфильтрованным)
pub fn store_list(records: &[WarrantyRecord]) -> Vec<String> {
    let mut stores: Vec<String> = records
        .iter()
        .map(|r| r.store.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    stores.sort();
    stores.dedup();

    if stores.is_empty() {
        return DEFAULT_STORES.iter().map(|s| s.to_string()).collect();
    }
    stores
}

pub fn compute_stats(records: &[WarrantyRecord]) -> Stats {
    Stats {
        total_records: records.len(),
        total_value: records.iter().map(|r| r.price).sum(),
        top_brand: most_frequent(records.iter().map(|r| r.device_brand.as_str())),
        top_store: most_frequent(records.iter().map(|r| r.store.as_str())),
    }
}

/// Самое частое непустое значение. При равенстве побеждает встреченное первым.
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> String {
    // Vec, а не HashMap: нужен порядок первого появления
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values.filter(|v| !v.trim().is_empty()) {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string()).unwrap_or_default()
}

/// Данные дашборда: отфильтрованные записи, магазины и карточки
pub fn summarize(records: &[WarrantyRecord], filters: &FilterState) -> DashboardResponse {
    let filtered = filter_records(records, filters);
    let stats = compute_stats(&filtered);
    DashboardResponse {
        stores: store_list(records),
        stats,
        total_loaded: records.len(),
        records: filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_warranty_record::WarrantyRecordDto;

    fn record(id: &str, date: &str, brand: &str, store: &str, price: f64) -> WarrantyRecord {
        WarrantyRecord::from_dto(
            id.into(),
            &WarrantyRecordDto {
                intake_date: date.into(),
                device_name: format!("{} device", brand),
                device_brand: brand.into(),
                defective_imei: format!("35{}", id),
                store: store.into(),
                replacement_date: String::new(),
                supplier: String::new(),
                delivered_imei: String::new(),
                fault: "Pantalla".into(),
                quantity: 1,
                price,
                resolution_date: String::new(),
                processed: false,
                notes: String::new(),
            },
        )
    }

    fn sample() -> Vec<WarrantyRecord> {
        vec![
            record("1", "2024-01-05", "Apple", "K24 Norte", 750.0),
            record("2", "2024-02-10", "Samsung", "K24 Sur", 300.0),
            record("3", "2024-03-15", "Samsung", "K24 Norte", 200.0),
            record("4", "2024-04-20", "Xiaomi", "K24 Sur", 150.0),
        ]
    }

    #[test]
    fn test_store_filter_restricts_records_and_stats() {
        let filters = FilterState {
            store: "K24 Norte".into(),
            ..Default::default()
        };
        let response = summarize(&sample(), &filters);

        assert_eq!(response.records.len(), 2);
        assert!(response.records.iter().all(|r| r.store == "K24 Norte"));
        assert_eq!(response.stats.total_records, 2);
        assert_eq!(response.stats.total_value, 950.0);
        assert_eq!(response.stats.top_store, "K24 Norte");
        assert_eq!(response.total_loaded, 4);
        assert_eq!(response.stores, ["K24 Norte", "K24 Sur"]);
    }

    #[test]
    fn test_no_filters_returns_input_unchanged() {
        let records = sample();
        assert_eq!(filter_records(&records, &FilterState::default()), records);
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let records = vec![
            record("1", "2024-01-01", "Motorola", "K24 Sur", 1.0),
            record("2", "2024-01-01", "Apple", "K24 Norte", 1.0),
            record("3", "2024-01-01", "Apple", "K24 Norte", 1.0),
            record("4", "2024-01-01", "Motorola", "K24 Sur", 1.0),
        ];
        let stats = compute_stats(&records);
        assert_eq!(stats.top_brand, "Motorola");
        assert_eq!(stats.top_store, "K24 Sur");
    }

    #[test]
    fn test_empty_values_are_not_counted() {
        let records = vec![
            record("1", "2024-01-01", "", "", 10.0),
            record("2", "2024-01-01", "", "", 10.0),
            record("3", "2024-01-01", "Nokia", "", 10.0),
        ];
        let stats = compute_stats(&records);
        assert_eq!(stats.top_brand, "Nokia");
        assert_eq!(stats.top_store, "");
        assert_eq!(compute_stats(&[]).top_brand, "");
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filters = FilterState {
            start_date: "2024-02-10".into(),
            end_date: "2024-03-15".into(),
            ..Default::default()
        };
        let ids: Vec<_> = filter_records(&sample(), &filters)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn test_query_matches_name_brand_or_imei() {
        let mut filters = FilterState {
            query: "SAMS".into(),
            ..Default::default()
        };
        assert_eq!(filter_records(&sample(), &filters).len(), 2);

        filters.query = "354".into();
        assert_eq!(filter_records(&sample(), &filters)[0].id, "4");

        filters.query = "xiaomi device".into();
        assert_eq!(filter_records(&sample(), &filters).len(), 1);
    }

    #[test]
    fn test_status_and_view_filters() {
        let mut records = sample();
        records[0].processed = true;
        records[1].delivered_imei = "999".into();
        records[2].archived = true;

        let by_status = |status: &str| {
            let filters = FilterState {
                status: status.into(),
                ..Default::default()
            };
            filter_records(&records, &filters)
                .into_iter()
                .map(|r| r.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(by_status("procesado"), ["1"]);
        assert_eq!(by_status("entregado"), ["2"]);
        assert_eq!(by_status("pendiente"), ["3", "4"]);

        let history = FilterState {
            view: RecordView::History,
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &history).len(), 1);

        let active = FilterState {
            view: RecordView::Active,
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &active).len(), 3);
    }

    #[test]
    fn test_default_store_list() {
        assert_eq!(store_list(&[]), DEFAULT_STORES);
    }
}
