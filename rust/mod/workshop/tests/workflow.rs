//! End-to-end lifecycle tests over an in-memory SQLite store.

use gaswork_core::{ListParams, ServiceError};
use gaswork_sql::SqliteStore;
use gaswork_workshop::model::{ClientRef, EntryStatus, SensorDefault, SensorReading, SparePart};
use gaswork_workshop::service::WorkshopService;
use gaswork_workshop::service::calibration::CalibrateInput;
use gaswork_workshop::service::catalog::{CatalogFilters, RegisterCatalogInput};
use gaswork_workshop::service::delivery::DeliveryInput;
use gaswork_workshop::service::history::HistoryFilters;
use gaswork_workshop::service::intake::IntakeInput;

fn service() -> WorkshopService {
    let sql = SqliteStore::open_in_memory().unwrap();
    WorkshopService::new(Box::new(sql)).unwrap()
}

fn acme() -> ClientRef {
    ClientRef {
        name: "Acme Mining".into(),
        tax_id: "B12345678".into(),
        department: "Mina Norte".into(),
    }
}

fn o2_row() -> SensorReading {
    SensorReading {
        sensor: "O2".into(),
        pre_alarm: "19.5".into(),
        alarm: "23.0".into(),
        calibration_value: "20.9".into(),
        valor_zero: "0.0".into(),
        valor_span: "20.9".into(),
        calibration_bottle: "BT-44".into(),
        approved: true,
    }
}

fn intake_new(
    svc: &WorkshopService,
    serial: &str,
    date: &str,
) -> gaswork_workshop::model::WorkshopEntry {
    svc.intake(IntakeInput {
        serial_number: serial.into(),
        entry_date: date.into(),
        observations: "annual check".into(),
        brand: Some("Draeger".into()),
        model: Some("X-am 2500".into()),
        client: Some(acme()),
    })
    .unwrap()
}

fn calibrate(
    svc: &WorkshopService,
    entry_id: &str,
    date: &str,
) -> gaswork_workshop::model::CalibrationRecord {
    svc.calibrate(entry_id, CalibrateInput {
        calibration_date: date.into(),
        technician: "Ana".into(),
        calibration_data: vec![o2_row()],
        spare_parts: vec![SparePart {
            description: "O2 sensor".into(),
            reference: "68 10 882".into(),
            under_warranty: false,
        }],
        internal_notes: "span drifted, sensor swapped".into(),
        use_department_as_client: false,
    })
    .unwrap()
}

fn deliver_one(svc: &WorkshopService, serial: &str, date: &str) {
    svc.deliver(DeliveryInput {
        serial_numbers: vec![serial.into()],
        delivery_note: "ALB-2024-001".into(),
        delivery_location: "central warehouse".into(),
        delivery_date: date.into(),
    })
    .unwrap();
}

#[test]
fn full_lifecycle_intake_calibrate_deliver() {
    let svc = service();

    let entry = intake_new(&svc, "SN-100", "2024-01-10");
    assert_eq!(entry.status, EntryStatus::PendingReview);
    assert_eq!(entry.brand, "Draeger");

    // First visit seeded the catalog.
    let catalog = svc.lookup_catalog("SN-100").unwrap();
    assert_eq!(catalog.brand, "Draeger");
    assert_eq!(catalog.current_client.unwrap().name, "Acme Mining");
    assert!(catalog.default_sensors.is_empty());

    let record = calibrate(&svc, &entry.id, "2024-01-12");
    assert_eq!(record.serial_number, "SN-100");
    assert_eq!(record.certificate_client, "Acme Mining");

    let entry = svc.get_entry(&entry.id).unwrap();
    assert_eq!(entry.status, EntryStatus::CalibratedPendingDelivery);
    assert_eq!(entry.technician.as_deref(), Some("Ana"));

    let pending = svc.calibrated_pending_delivery().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].calibration.id, record.id);

    deliver_one(&svc, "SN-100", "2024-01-15");

    let entry = svc.get_entry(&entry.id).unwrap();
    assert_eq!(entry.status, EntryStatus::Delivered);
    assert_eq!(entry.delivery_note.as_deref(), Some("ALB-2024-001"));
    assert_eq!(entry.delivery_date.as_deref(), Some("2024-01-15"));

    let report = svc.delivered().unwrap();
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].days_in_workshop, 5);
    assert_eq!(report.average_days, 5);

    let history = svc.history("SN-100").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].technician, "Ana");
}

#[test]
fn one_open_entry_per_serial() {
    let svc = service();

    intake_new(&svc, "SN-200", "2024-02-01");

    let second = svc.intake(IntakeInput {
        serial_number: "SN-200".into(),
        entry_date: "2024-02-02".into(),
        ..Default::default()
    });
    assert!(matches!(second, Err(ServiceError::AlreadyInWorkshop(_))));

    // Still blocked after calibration; only delivery reopens the serial.
    let open = svc.open_entry("SN-200").unwrap();
    calibrate(&svc, &open.id, "2024-02-03");
    let third = svc.intake(IntakeInput {
        serial_number: "SN-200".into(),
        entry_date: "2024-02-04".into(),
        ..Default::default()
    });
    assert!(matches!(third, Err(ServiceError::AlreadyInWorkshop(_))));

    deliver_one(&svc, "SN-200", "2024-02-05");
    let fourth = svc
        .intake(IntakeInput {
            serial_number: "SN-200".into(),
            entry_date: "2024-02-10".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(fourth.status, EntryStatus::PendingReview);
}

#[test]
fn unknown_serial_requires_identity_and_seeds_catalog_once() {
    let svc = service();

    let missing = svc.intake(IntakeInput {
        serial_number: "SN-300".into(),
        entry_date: "2024-03-01".into(),
        brand: Some("Draeger".into()),
        // model and client missing
        ..Default::default()
    });
    assert!(matches!(missing, Err(ServiceError::Validation(_))));
    assert!(matches!(
        svc.lookup_catalog("SN-300"),
        Err(ServiceError::NotFound(_))
    ));

    intake_new(&svc, "SN-300", "2024-03-02");
    assert_eq!(svc.list_catalog(&ListParams::default()).unwrap().total, 1);

    // A later visit of a known serial creates no second catalog row and
    // needs no identity fields.
    deliver_after_calibration(&svc, "SN-300", "2024-03-05");
    svc.intake(IntakeInput {
        serial_number: "SN-300".into(),
        entry_date: "2024-03-10".into(),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(svc.list_catalog(&ListParams::default()).unwrap().total, 1);
}

fn deliver_after_calibration(svc: &WorkshopService, serial: &str, date: &str) {
    let open = svc.open_entry(serial).unwrap();
    calibrate(svc, &open.id, date);
    deliver_one(svc, serial, date);
}

#[test]
fn intake_overrides_snapshot_without_touching_catalog() {
    let svc = service();
    intake_new(&svc, "SN-310", "2024-03-01");
    deliver_after_calibration(&svc, "SN-310", "2024-03-03");

    let entry = svc
        .intake(IntakeInput {
            serial_number: "SN-310".into(),
            entry_date: "2024-03-10".into(),
            brand: Some("Honeywell".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(entry.brand, "Honeywell");
    // Catalog keeps its own identity; the override was entry-local.
    assert_eq!(svc.lookup_catalog("SN-310").unwrap().brand, "Draeger");
}

#[test]
fn calibrate_rejects_wrong_state_and_bad_input() {
    let svc = service();
    let entry = intake_new(&svc, "SN-400", "2024-04-01");

    let no_rows = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "2024-04-02".into(),
        technician: "Ana".into(),
        ..Default::default()
    });
    assert!(matches!(no_rows, Err(ServiceError::Validation(_))));

    let too_many = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "2024-04-02".into(),
        technician: "Ana".into(),
        calibration_data: vec![o2_row(); 7],
        ..Default::default()
    });
    assert!(matches!(too_many, Err(ServiceError::Validation(_))));

    let bad_date = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "02/04/2024".into(),
        technician: "Ana".into(),
        calibration_data: vec![o2_row()],
        ..Default::default()
    });
    assert!(matches!(bad_date, Err(ServiceError::Validation(_))));

    calibrate(&svc, &entry.id, "2024-04-02");

    // Already CALIBRATED_PENDING_DELIVERY: a second calibration of the
    // same visit is refused and leaves exactly one record behind.
    let again = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "2024-04-03".into(),
        technician: "Luis".into(),
        calibration_data: vec![o2_row()],
        ..Default::default()
    });
    assert!(matches!(again, Err(ServiceError::InvalidState(_))));
    assert_eq!(svc.history("SN-400").unwrap().len(), 1);
}

#[test]
fn certificate_labeled_with_department() {
    let svc = service();
    let entry = intake_new(&svc, "SN-410", "2024-04-01");

    let record = svc
        .calibrate(&entry.id, CalibrateInput {
            calibration_date: "2024-04-02".into(),
            technician: "Ana".into(),
            calibration_data: vec![o2_row()],
            use_department_as_client: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(record.certificate_client, "Mina Norte");
    assert_eq!(record.client_name, "Acme Mining");
}

#[test]
fn department_label_requires_a_department() {
    let svc = service();
    let entry = svc
        .intake(IntakeInput {
            serial_number: "SN-420".into(),
            entry_date: "2024-04-01".into(),
            brand: Some("Draeger".into()),
            model: Some("X-am 2500".into()),
            client: Some(ClientRef {
                name: "Solo SL".into(),
                tax_id: "B99999999".into(),
                department: String::new(),
            }),
            ..Default::default()
        })
        .unwrap();

    let result = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "2024-04-02".into(),
        technician: "Ana".into(),
        calibration_data: vec![o2_row()],
        use_department_as_client: true,
        ..Default::default()
    });
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[test]
fn internal_notes_stay_off_the_certificate() {
    let svc = service();
    let entry = intake_new(&svc, "SN-430", "2024-04-01");
    let record = calibrate(&svc, &entry.id, "2024-04-02");

    let view = record.certificate_view();
    assert!(view.get("internalNotes").is_none());
    assert_eq!(view["client"], "Acme Mining");
}

#[test]
fn batch_delivery_is_all_or_nothing() {
    let svc = service();

    let a = intake_new(&svc, "SN-500", "2024-05-01");
    calibrate(&svc, &a.id, "2024-05-02");
    let b = intake_new(&svc, "SN-501", "2024-05-01");
    // SN-501 never calibrated; SN-502 never in the workshop.

    let result = svc.deliver(DeliveryInput {
        serial_numbers: vec!["SN-500".into(), "SN-501".into(), "SN-502".into()],
        delivery_note: "ALB-2024-002".into(),
        delivery_location: "client site".into(),
        delivery_date: "2024-05-03".into(),
    });
    let err = result.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    let msg = err.to_string();
    assert!(msg.contains("SN-501"));
    assert!(msg.contains("SN-502"));
    assert!(!msg.contains("SN-500,"));

    // Nothing moved, including the deliverable one.
    assert_eq!(
        svc.get_entry(&a.id).unwrap().status,
        EntryStatus::CalibratedPendingDelivery
    );
    assert_eq!(svc.get_entry(&b.id).unwrap().status, EntryStatus::PendingReview);
    assert!(svc.delivered().unwrap().items.is_empty());
}

#[test]
fn batch_delivery_shares_one_note() {
    let svc = service();
    for serial in ["SN-510", "SN-511"] {
        let entry = intake_new(&svc, serial, "2024-05-01");
        calibrate(&svc, &entry.id, "2024-05-02");
    }

    let delivered = svc
        .deliver(DeliveryInput {
            serial_numbers: vec!["SN-510".into(), "SN-511".into()],
            delivery_note: "ALB-2024-003".into(),
            delivery_location: "client site".into(),
            delivery_date: "2024-05-04".into(),
        })
        .unwrap();
    assert_eq!(delivered.len(), 2);
    for entry in &delivered {
        assert_eq!(entry.status, EntryStatus::Delivered);
        assert_eq!(entry.delivery_note.as_deref(), Some("ALB-2024-003"));
    }

    let report = svc.delivered().unwrap();
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.average_days, 3);
}

#[test]
fn batch_delivery_rejects_duplicates_and_empty() {
    let svc = service();

    let empty = svc.deliver(DeliveryInput {
        delivery_note: "ALB-2024-004".into(),
        delivery_location: "site".into(),
        delivery_date: "2024-05-01".into(),
        ..Default::default()
    });
    assert!(matches!(empty, Err(ServiceError::Validation(_))));

    let doubled = svc.deliver(DeliveryInput {
        serial_numbers: vec!["SN-520".into(), "SN-520".into()],
        delivery_note: "ALB-2024-004".into(),
        delivery_location: "site".into(),
        delivery_date: "2024-05-01".into(),
    });
    assert!(matches!(doubled, Err(ServiceError::Validation(_))));
}

#[test]
fn delivery_refreshes_catalog_client() {
    let svc = service();
    intake_new(&svc, "SN-530", "2024-05-01");
    deliver_after_calibration(&svc, "SN-530", "2024-05-03");

    // Unit comes back under a new owner; catalog follows at delivery.
    let entry = svc
        .intake(IntakeInput {
            serial_number: "SN-530".into(),
            entry_date: "2024-06-01".into(),
            client: Some(ClientRef {
                name: "Beta Gas".into(),
                tax_id: "B87654321".into(),
                department: String::new(),
            }),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        svc.lookup_catalog("SN-530").unwrap().current_client.unwrap().name,
        "Acme Mining"
    );

    calibrate(&svc, &entry.id, "2024-06-02");
    deliver_one(&svc, "SN-530", "2024-06-03");
    assert_eq!(
        svc.lookup_catalog("SN-530").unwrap().current_client.unwrap().name,
        "Beta Gas"
    );
}

#[test]
fn calibration_defaults_carry_identity_and_reset_measurements() {
    let svc = service();
    intake_new(&svc, "SN-600", "2024-06-01");
    deliver_after_calibration(&svc, "SN-600", "2024-06-03");

    let rows = svc.calibration_defaults("SN-600").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sensor, "O2");
    assert_eq!(rows[0].pre_alarm, "19.5");
    assert_eq!(rows[0].calibration_value, "20.9");
    assert!(rows[0].valor_zero.is_empty());
    assert!(rows[0].valor_span.is_empty());
    assert!(rows[0].calibration_bottle.is_empty());
    assert!(!rows[0].approved);
}

#[test]
fn calibration_defaults_fall_back_to_catalog() {
    let svc = service();
    svc.register_catalog(RegisterCatalogInput {
        serial_number: "SN-610".into(),
        brand: "Honeywell".into(),
        model: "BW Clip".into(),
        default_sensors: vec![SensorDefault {
            sensor: "H2S".into(),
            pre_alarm: "5".into(),
            alarm: "10".into(),
            calibration_value: "25".into(),
        }],
        ..Default::default()
    })
    .unwrap();

    let rows = svc.calibration_defaults("SN-610").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sensor, "H2S");
    assert!(rows[0].valor_zero.is_empty());
    assert!(!rows[0].approved);

    // Unknown serial suggests nothing at all.
    assert!(svc.calibration_defaults("SN-0").unwrap().is_empty());
}

#[test]
fn catalog_search_is_case_insensitive_substring() {
    let svc = service();
    intake_new(&svc, "SN-700", "2024-07-01");

    let hits = svc
        .search_catalog(&CatalogFilters {
            client: Some("acme".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].serial_number, "SN-700");

    let hits = svc
        .search_catalog(&CatalogFilters {
            client: Some("acme".into()),
            brand: Some("honeywell".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(hits.is_empty());

    let none = svc
        .search_catalog(&CatalogFilters {
            serial: Some("ZZ".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn catalog_listing_paginates() {
    let svc = service();
    for serial in ["SN-A", "SN-B", "SN-C"] {
        svc.register_catalog(RegisterCatalogInput {
            serial_number: serial.into(),
            brand: "Draeger".into(),
            model: "Pac 6500".into(),
            ..Default::default()
        })
        .unwrap();
    }

    let page = svc
        .list_catalog(&ListParams { limit: 2, offset: 0 })
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].serial_number, "SN-A");

    let rest = svc
        .list_catalog(&ListParams { limit: 2, offset: 2 })
        .unwrap();
    assert_eq!(rest.total, 3);
    assert_eq!(rest.items.len(), 1);
    assert_eq!(rest.items[0].serial_number, "SN-C");
}

#[test]
fn catalog_serial_is_immutable() {
    let svc = service();
    intake_new(&svc, "SN-710", "2024-07-01");

    let renamed = svc.update_catalog(
        "SN-710",
        serde_json::json!({"serialNumber": "SN-999"}),
    );
    assert!(matches!(renamed, Err(ServiceError::Validation(_))));

    let updated = svc
        .update_catalog(
            "SN-710",
            serde_json::json!({"generalObservations": "pump unit, handle with care"}),
        )
        .unwrap();
    assert_eq!(updated.general_observations, "pump unit, handle with care");
    assert_eq!(updated.serial_number, "SN-710");
}

#[test]
fn catalog_delete_guarded_by_workshop_references() {
    let svc = service();
    intake_new(&svc, "SN-720", "2024-07-01");

    // Referenced by an open entry.
    assert!(matches!(
        svc.delete_catalog("SN-720"),
        Err(ServiceError::InvalidState(_))
    ));

    // Delivered entries still count as references; history stays intact.
    deliver_after_calibration(&svc, "SN-720", "2024-07-03");
    assert!(matches!(
        svc.delete_catalog("SN-720"),
        Err(ServiceError::InvalidState(_))
    ));

    // A never-visited entry can go.
    svc.register_catalog(RegisterCatalogInput {
        serial_number: "SN-721".into(),
        brand: "Draeger".into(),
        model: "Pac 6500".into(),
        ..Default::default()
    })
    .unwrap();
    svc.delete_catalog("SN-721").unwrap();
    assert!(matches!(
        svc.lookup_catalog("SN-721"),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn duplicate_catalog_registration_conflicts() {
    let svc = service();
    let input = || RegisterCatalogInput {
        serial_number: "SN-730".into(),
        brand: "Draeger".into(),
        model: "X-am 5000".into(),
        ..Default::default()
    };
    svc.register_catalog(input()).unwrap();
    assert!(matches!(
        svc.register_catalog(input()),
        Err(ServiceError::AlreadyExists(_))
    ));
}

#[test]
fn history_search_enriches_with_derived_stats() {
    let svc = service();
    intake_new(&svc, "SN-800", "2024-08-01");
    deliver_after_calibration(&svc, "SN-800", "2024-08-03");
    let entry = svc
        .intake(IntakeInput {
            serial_number: "SN-800".into(),
            entry_date: "2024-09-01".into(),
            ..Default::default()
        })
        .unwrap();
    calibrate(&svc, &entry.id, "2024-09-02");

    let hits = svc
        .search_history(&HistoryFilters {
            serial: Some("800".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 2);
    // Newest first, and every hit carries the same per-serial stats.
    assert_eq!(hits[0].record.calibration_date, "2024-09-02");
    for hit in &hits {
        assert_eq!(hit.last_calibration_date, "2024-09-02");
        assert_eq!(hit.calibration_count, 2);
    }

    let none = svc
        .search_history(&HistoryFilters {
            cliente: Some("unknown co".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn non_padded_dates_are_rejected_at_every_door() {
    let svc = service();

    // Stored dates order lexicographically; a "2024-9-01" slipping through
    // would sort after "2024-10-02". No date field may accept it.
    let intake = svc.intake(IntakeInput {
        serial_number: "SN-950".into(),
        entry_date: "2024-9-01".into(),
        observations: String::new(),
        brand: Some("Draeger".into()),
        model: Some("X-am 2500".into()),
        client: Some(acme()),
    });
    assert!(matches!(intake, Err(ServiceError::Validation(_))));

    let entry = intake_new(&svc, "SN-950", "2024-09-01");
    let cal = svc.calibrate(&entry.id, CalibrateInput {
        calibration_date: "2024-9-02".into(),
        technician: "Ana".into(),
        calibration_data: vec![o2_row()],
        ..Default::default()
    });
    assert!(matches!(cal, Err(ServiceError::Validation(_))));

    calibrate(&svc, &entry.id, "2024-09-02");
    let del = svc.deliver(DeliveryInput {
        serial_numbers: vec!["SN-950".into()],
        delivery_note: "ALB-2024-005".into(),
        delivery_location: "site".into(),
        delivery_date: "2024-9-03".into(),
    });
    assert!(matches!(del, Err(ServiceError::Validation(_))));
    deliver_one(&svc, "SN-950", "2024-09-03");

    // With padding enforced, a later month really is the latest calibration.
    let entry = svc
        .intake(IntakeInput {
            serial_number: "SN-950".into(),
            entry_date: "2024-10-01".into(),
            ..Default::default()
        })
        .unwrap();
    calibrate(&svc, &entry.id, "2024-10-02");

    let hits = svc
        .search_history(&HistoryFilters {
            serial: Some("950".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits[0].record.calibration_date, "2024-10-02");
    for hit in &hits {
        assert_eq!(hit.last_calibration_date, "2024-10-02");
    }
}

#[test]
fn pending_and_delivered_views() {
    let svc = service();
    intake_new(&svc, "SN-900", "2024-09-01");
    let b = intake_new(&svc, "SN-901", "2024-09-01");
    calibrate(&svc, &b.id, "2024-09-02");

    let pending = svc.pending_review().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].serial_number, "SN-900");

    let calibrated = svc.calibrated_pending_delivery().unwrap();
    assert_eq!(calibrated.len(), 1);
    assert_eq!(calibrated[0].entry.serial_number, "SN-901");

    // Same-day turnaround counts as zero days.
    deliver_one(&svc, "SN-901", "2024-09-01");
    let report = svc.delivered().unwrap();
    assert_eq!(report.items[0].days_in_workshop, 0);
    assert_eq!(report.average_days, 0);
}
