use super::{opt_text, FieldReader, FormBody, FormValue, RawForm, ValidationErrors};
use crate::models::{FullRecordBody, PrescriptionItem, RecordInitBody};

const PRESCRIPTION_FIELDS: &[&str] = &["drug_id", "dosage", "frequency", "duration_days", "quantity"];

impl FormBody for RecordInitBody {
    const FIELDS: &'static [&'static str] = &["appointment_id", "patient_id", "doctor_id"];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let appointment_id = r.required_id("appointment_id");
        let patient_id = r.required_id("patient_id");
        let doctor_id = r.required_id("doctor_id");
        r.finish(|| {
            Some(RecordInitBody {
                appointment_id: appointment_id?,
                patient_id: patient_id?,
                doctor_id: doctor_id?,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("appointment_id", self.appointment_id)
            .with("patient_id", self.patient_id)
            .with("doctor_id", self.doctor_id)
    }
}

fn prescription_item(row: &mut FieldReader<'_>) -> Option<PrescriptionItem> {
    let drug_id = row.required_id("drug_id");
    let dosage = row.required_text("dosage");
    let frequency = row.required_text("frequency");
    let duration_days = row.count("duration_days", 1);
    let quantity = row.count("quantity", 1);
    Some(PrescriptionItem {
        drug_id: drug_id?,
        dosage: dosage?.into_inner(),
        frequency: frequency?.into_inner(),
        duration_days: duration_days?,
        quantity: quantity?,
    })
}

fn prescription_row(item: &PrescriptionItem) -> RawForm {
    RawForm::new()
        .with("drug_id", item.drug_id)
        .with("dosage", item.dosage.as_str())
        .with("frequency", item.frequency.as_str())
        .with("duration_days", i64::from(item.duration_days))
        .with("quantity", i64::from(item.quantity))
}

impl FormBody for FullRecordBody {
    const FIELDS: &'static [&'static str] = &[
        "patient_id",
        "doctor_id",
        "appointment_id",
        "diagnosis",
        "symptoms",
        "treatment",
        "notes",
        "prescription",
        "files",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let patient_id = r.required_id("patient_id");
        let doctor_id = r.required_id("doctor_id");
        let appointment_id = r.optional_id("appointment_id");
        let diagnosis = r.required_text("diagnosis");
        let symptoms = r.optional_text("symptoms");
        let treatment = r.optional_text("treatment");
        let notes = r.optional_text("notes");
        let prescription = r.rows("prescription", PRESCRIPTION_FIELDS, prescription_item);
        let files = r.tagged_files("files");

        r.finish(|| {
            Some(FullRecordBody {
                patient_id: patient_id?,
                doctor_id: doctor_id?,
                appointment_id,
                diagnosis: diagnosis?,
                symptoms,
                treatment,
                notes,
                prescription,
                files,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("patient_id", self.patient_id)
            .with("doctor_id", self.doctor_id)
            .with("appointment_id", self.appointment_id)
            .with("diagnosis", self.diagnosis.as_str())
            .with("symptoms", opt_text(&self.symptoms))
            .with("treatment", opt_text(&self.treatment))
            .with("notes", opt_text(&self.notes))
            .with(
                "prescription",
                FormValue::Rows(self.prescription.iter().map(prescription_row).collect()),
            )
            .with_tagged_files("files", self.files.clone())
    }
}
