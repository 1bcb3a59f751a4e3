//! Demo records used to seed a local store that has never been written.

use chrono::NaiveDate;

use crate::models::{
    Appointment, AppointmentStatus, Doctor, Patient, PatientStatus, Priority, ReportStatus,
    TestReport,
};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap_or_default()
}

struct PatientSeed {
    id: &'static str,
    name: &'static str,
    age: u32,
    gender: &'static str,
    phone: &'static str,
    email: &'static str,
    address: &'static str,
    status: PatientStatus,
    condition: &'static str,
    admitted: u32,
    doctor: &'static str,
    blood_group: &'static str,
    emergency_contact: &'static str,
}

const PATIENTS: [PatientSeed; 5] = [
    PatientSeed {
        id: "P001",
        name: "John Smith",
        age: 45,
        gender: "Male",
        phone: "+1 (555) 123-4567",
        email: "john.smith@email.com",
        address: "123 Main St, New York, NY 10001",
        status: PatientStatus::Critical,
        condition: "Cardiac Arrest",
        admitted: 10,
        doctor: "Dr. Johnson",
        blood_group: "O+",
        emergency_contact: "+1 (555) 987-6543",
    },
    PatientSeed {
        id: "P002",
        name: "Emily Davis",
        age: 32,
        gender: "Female",
        phone: "+1 (555) 234-5678",
        email: "emily.davis@email.com",
        address: "456 Oak Ave, Los Angeles, CA 90210",
        status: PatientStatus::Normal,
        condition: "Regular Checkup",
        admitted: 15,
        doctor: "Dr. Wilson",
        blood_group: "A+",
        emergency_contact: "+1 (555) 876-5432",
    },
    PatientSeed {
        id: "P003",
        name: "Michael Brown",
        age: 58,
        gender: "Male",
        phone: "+1 (555) 345-6789",
        email: "michael.brown@email.com",
        address: "789 Pine St, Chicago, IL 60601",
        status: PatientStatus::Critical,
        condition: "Pneumonia",
        admitted: 12,
        doctor: "Dr. Johnson",
        blood_group: "B+",
        emergency_contact: "+1 (555) 765-4321",
    },
    PatientSeed {
        id: "P004",
        name: "Sarah Wilson",
        age: 28,
        gender: "Female",
        phone: "+1 (555) 456-7890",
        email: "sarah.wilson@email.com",
        address: "321 Elm St, Houston, TX 77001",
        status: PatientStatus::Normal,
        condition: "Pregnancy Checkup",
        admitted: 14,
        doctor: "Dr. Martinez",
        blood_group: "AB+",
        emergency_contact: "+1 (555) 654-3210",
    },
    PatientSeed {
        id: "P005",
        name: "Robert Taylor",
        age: 67,
        gender: "Male",
        phone: "+1 (555) 567-8901",
        email: "robert.taylor@email.com",
        address: "654 Maple Ave, Phoenix, AZ 85001",
        status: PatientStatus::Stable,
        condition: "Diabetes Management",
        admitted: 11,
        doctor: "Dr. Johnson",
        blood_group: "O-",
        emergency_contact: "+1 (555) 543-2109",
    },
];

pub fn patients() -> Vec<Patient> {
    PATIENTS
        .iter()
        .map(|seed| Patient {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            age: seed.age,
            gender: seed.gender.to_string(),
            phone: seed.phone.to_string(),
            email: seed.email.to_string(),
            address: seed.address.to_string(),
            status: seed.status,
            condition: seed.condition.to_string(),
            admission_date: date(1, seed.admitted),
            doctor: seed.doctor.to_string(),
            blood_group: seed.blood_group.to_string(),
            emergency_contact: seed.emergency_contact.to_string(),
            created_at: None,
            updated_at: None,
        })
        .collect()
}

/// The attending doctors named by the other fixture sets.
pub fn doctors() -> Vec<Doctor> {
    vec![
        Doctor::new("D001", "James", "Johnson")
            .with_email("j.johnson@meditrack.example")
            .with_phone("+1 (555) 100-2001"),
        Doctor::new("D002", "Linda", "Wilson")
            .with_email("l.wilson@meditrack.example")
            .with_phone("+1 (555) 100-2002"),
        Doctor::new("D003", "Carlos", "Martinez")
            .with_email("c.martinez@meditrack.example")
            .with_phone("+1 (555) 100-2003"),
        Doctor::new("D004", "Anna", "Smith").with_email("a.smith@meditrack.example"),
    ]
}

pub fn appointments() -> Vec<Appointment> {
    vec![
        Appointment::new("A001", "John Smith", "Dr. Johnson", date(1, 16), "09:00")
            .with_patient_id("P001")
            .with_kind("Consultation")
            .with_notes("Follow-up for cardiac condition"),
        Appointment::new("A002", "Emily Davis", "Dr. Wilson", date(1, 16), "10:30")
            .with_patient_id("P002")
            .with_kind("Checkup")
            .with_status(AppointmentStatus::Completed)
            .with_notes("Regular health checkup")
            .with_duration("45 minutes"),
        Appointment::new("A003", "Michael Brown", "Dr. Johnson", date(1, 16), "14:00")
            .with_patient_id("P003")
            .with_kind("Treatment")
            .with_status(AppointmentStatus::InProgress)
            .with_notes("Pneumonia treatment session")
            .with_duration("60 minutes"),
        Appointment::new("A004", "Sarah Wilson", "Dr. Martinez", date(1, 17), "11:00")
            .with_patient_id("P004")
            .with_kind("Consultation")
            .with_notes("Pregnancy consultation"),
        Appointment::new("A005", "Robert Taylor", "Dr. Johnson", date(1, 17), "15:30")
            .with_patient_id("P005")
            .with_kind("Follow-up")
            .with_notes("Diabetes management follow-up"),
    ]
}

pub fn reports() -> Vec<TestReport> {
    let mut reports = vec![
        TestReport::new("R001", "John Smith", "Blood Test", date(1, 14))
            .with_status(ReportStatus::Completed),
        TestReport::new("R002", "Emily Davis", "X-Ray", date(1, 15))
            .with_status(ReportStatus::Completed),
        TestReport::new("R003", "Michael Brown", "CT Scan", date(1, 14))
            .with_status(ReportStatus::InReview)
            .with_priority(Priority::Critical),
        TestReport::new("R004", "Sarah Wilson", "Ultrasound", date(1, 15)),
        TestReport::new("R005", "Robert Taylor", "Blood Sugar Test", date(1, 13))
            .with_status(ReportStatus::Completed)
            .with_priority(Priority::Urgent),
    ];

    let details = [
        (
            "P001",
            Some(date(1, 15)),
            "Dr. Johnson",
            "Tech. Sarah",
            "Hemoglobin: 12.5 g/dL (Normal), White Blood Cells: 7,200/μL (Normal), Platelets: 250,000/μL (Normal)",
            "All values within normal range. Continue current medication.",
        ),
        (
            "P002",
            Some(date(1, 15)),
            "Dr. Wilson",
            "Tech. Mike",
            "Chest X-ray shows clear lungs with no signs of infection or abnormalities.",
            "Normal chest X-ray. No follow-up required.",
        ),
        (
            "P003",
            Some(date(1, 16)),
            "Dr. Johnson",
            "Tech. Lisa",
            "CT scan of chest shows signs of pneumonia in lower right lobe.",
            "Requires immediate treatment. Patient has been notified.",
        ),
        (
            "P004",
            None,
            "Dr. Martinez",
            "Tech. Anna",
            "",
            "Routine pregnancy ultrasound scheduled.",
        ),
        (
            "P005",
            Some(date(1, 14)),
            "Dr. Johnson",
            "Tech. Sarah",
            "Fasting glucose: 145 mg/dL (Elevated), HbA1c: 7.2% (Elevated)",
            "Blood sugar levels elevated. Adjust medication dosage.",
        ),
    ];

    for (report, (patient_id, report_date, doctor, technician, results, notes)) in
        reports.iter_mut().zip(details)
    {
        report.patient_id = patient_id.to_string();
        report.report_date = report_date;
        report.doctor = doctor.to_string();
        report.technician = technician.to_string();
        report.results = results.to_string();
        report.notes = notes.to_string();
    }

    reports
}
