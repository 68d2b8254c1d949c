//! In-memory doctor directory

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

use crate::intent;

/// A single doctor listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRecord {
    pub name: String,
    pub specialty: String,
    pub hours: String,
    pub location: String,
    pub contact: String,
}

impl DoctorRecord {
    pub fn new(
        name: impl Into<String>,
        specialty: impl Into<String>,
        hours: impl Into<String>,
        location: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            hours: hours.into(),
            location: location.into(),
            contact: contact.into(),
        }
    }

    /// One-line summary used in composed answers and LLM context
    pub fn summary(&self) -> String {
        format!(
            "{} ({}), available {}, {}, contact {}",
            self.name, self.specialty, self.hours, self.location, self.contact
        )
    }
}

/// Append-only list of doctors shared for the lifetime of the process.
///
/// Records are never updated or removed. Reads hand out clones so no lock is
/// held across an await point by callers.
#[derive(Debug, Default)]
pub struct DoctorDirectory {
    records: RwLock<Vec<DoctorRecord>>,
}

impl DoctorDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory seeded with the default clinic roster
    pub fn with_defaults() -> Self {
        Self::from_records(default_roster())
    }

    pub fn from_records(records: Vec<DoctorRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Append a doctor and return a confirmation message.
    pub fn add_new_doctor(
        &self,
        name: &str,
        specialty: &str,
        hours: &str,
        location: &str,
        contact: &str,
    ) -> String {
        self.add(DoctorRecord::new(name, specialty, hours, location, contact))
    }

    /// Append an already-built record and return a confirmation message.
    pub fn add(&self, record: DoctorRecord) -> String {
        let message = format!(
            "Added {} ({}) to the directory",
            record.name, record.specialty
        );
        // A poisoned lock still holds a valid Vec; appends never leave it half-written.
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        message
    }

    /// Case-insensitive substring match on specialty.
    ///
    /// Returns every match in insertion order. No match yields an empty
    /// vector, as does a blank needle.
    pub fn find_doctor(&self, specialty: &str) -> Vec<DoctorRecord> {
        let needle = specialty.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.specialty.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Pick doctors for a free-text health query.
    ///
    /// Specialty hints from the query vocabulary are tried in order and the
    /// union is returned without duplicates. With no match the general
    /// physicians are suggested instead.
    pub fn recommend(&self, query: &str) -> Vec<DoctorRecord> {
        let mut picked: Vec<DoctorRecord> = Vec::new();
        for fragment in intent::specialty_hints(query) {
            for record in self.find_doctor(fragment) {
                if !picked.contains(&record) {
                    picked.push(record);
                }
            }
        }

        if picked.is_empty() {
            picked = self.find_doctor("general");
        }
        picked
    }

    /// Snapshot of every record
    pub fn all(&self) -> Vec<DoctorRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The clinic roster loaded at startup
pub fn default_roster() -> Vec<DoctorRecord> {
    vec![
        DoctorRecord::new(
            "Dr. Janet Dyne",
            "Endocrinology (Diabetes Care)",
            "10:00 AM - 1:00 PM",
            "City Health Clinic",
            "janet.dyne@healthclinic.com",
        ),
        DoctorRecord::new(
            "Dr. Don Blake",
            "Cardiology (Heart Specialist)",
            "2:00 PM - 5:00 PM",
            "Metro Cardiac Center",
            "don.blake@metrocardiac.com",
        ),
        DoctorRecord::new(
            "Dr. Susan D'Souza",
            "Oncology (Cancer Care)",
            "11:00 AM - 2:00 PM",
            "Hope Cancer Institute",
            "susan.dsouza@hopecancer.org",
        ),
        DoctorRecord::new(
            "Dr. Matt Murdock",
            "Psychiatry (Mental Health)",
            "4:00 PM - 7:00 PM",
            "Mind Care Center",
            "matt.murdock@mindcare.com",
        ),
        DoctorRecord::new(
            "Dr. Dinah Lance",
            "General Physician",
            "9:00 AM - 12:00 PM",
            "Downtown Medical Center",
            "dinah.lance@downtownmed.com",
        ),
    ]
}
