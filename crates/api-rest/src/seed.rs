//! Demo data loaded by the binary so a fresh backend has something to show.

use crate::store::{Row, Store};
use crate::tables::{APPOINTMENTS, DRUGS, HOSPITALS, LECTURERS, ORDERS, PATIENTS};
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

pub async fn seed(store: &Store) {
    let now = Utc::now();
    let at = |hours: i64| (now + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true);

    store
        .insert(
            &DRUGS,
            row(json!({
                "name": "Atropine 1% eye drops",
                "price": 45000.0,
                "stock_quantity": 120,
                "unit": "bottle",
                "manufacturer": "Alcon",
                "category": "EYE_DROPS",
            })),
        )
        .await;
    store
        .insert(
            &DRUGS,
            row(json!({
                "name": "Tobradex ointment",
                "price": 62000.0,
                "stock_quantity": 0,
                "unit": "tube",
                "category": "OINTMENT",
            })),
        )
        .await;
    store
        .insert(
            &HOSPITALS,
            row(json!({
                "name": "Central Eye Hospital",
                "address": "85 Ba Trieu, Hanoi",
                "email": "contact@central-eye.example",
                "latitude": 21.0167,
                "longitude": 105.8492,
            })),
        )
        .await;
    store
        .insert(
            &LECTURERS,
            row(json!({
                "full_name": "Dr. Linh Tran",
                "email": "linh.tran@example.edu",
                "specialization": "Glaucoma",
                "academic_title": "Associate Professor",
            })),
        )
        .await;
    for (user_id, name, gender) in [(11, "Minh Nguyen", "MALE"), (12, "An Pham", "FEMALE")] {
        store
            .insert(
                &PATIENTS,
                row(json!({
                    "user_id": user_id,
                    "full_name": name,
                    "date_of_birth": "1984-03-02",
                    "gender": gender,
                })),
            )
            .await;
    }
    for (patient_id, kind, status, hours) in [
        (1, "OFFLINE", "CONFIRMED", 0),
        (2, "ONLINE", "PENDING", 26),
        (1, "ONLINE", "COMPLETED", -72),
    ] {
        store
            .insert(
                &APPOINTMENTS,
                row(json!({
                    "patient_id": patient_id,
                    "doctor_id": 1,
                    "hospital_id": 1,
                    "scheduled_at": at(hours),
                    "appointment_type": kind,
                    "status": status,
                    "reason": "Blurred vision",
                })),
            )
            .await;
    }
    store
        .insert(
            &ORDERS,
            row(json!({
                "patient_id": 1,
                "items": [{ "drug_id": 1, "quantity": 2, "unit_price": 45000.0 }],
                "total_amount": 90000.0,
                "status": "PENDING",
            })),
        )
        .await;
    tracing::info!("seeded demo data");
}
