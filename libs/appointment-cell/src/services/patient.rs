use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use student_cell::StudentIdentity;

use crate::models::{AppointmentError, Patient};

/// First word is the first name, the rest the last name. A single word
/// fills both.
pub fn split_name(persona: &str) -> (String, String) {
    let mut words = persona.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");

    if rest.is_empty() {
        (first.clone(), first)
    } else {
        (first, rest)
    }
}

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn find_by_control(&self, nu_control: &str) -> Result<Option<Patient>, AppointmentError> {
        let path = format!("/rest/v1/patients?nu_control=eq.{}", urlencoding::encode(nu_control));

        let patients: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(patients.into_iter().next())
    }

    /// Create the patient, or refresh name and e-mail from the profile.
    /// The assigned psychologist is only set on creation.
    pub async fn upsert(&self, student: &StudentIdentity, staff_id: i64) -> Result<Patient, AppointmentError> {
        let (first_name, last_name) = split_name(&student.persona);

        let written: Vec<Patient> = match self.find_by_control(&student.numero_control).await? {
            Some(existing) => {
                debug!("Updating patient {}", existing.id);
                self.supabase
                    .request_with_headers(
                        Method::PATCH,
                        &format!("/rest/v1/patients?id=eq.{}", existing.id),
                        Some(json!({
                            "first_name": first_name,
                            "last_name": last_name,
                            "email": student.email,
                        })),
                        Some(SupabaseClient::return_representation()),
                    )
                    .await?
            }
            None => {
                info!("Registering patient {}", student.numero_control);
                self.supabase
                    .request_with_headers(
                        Method::POST,
                        "/rest/v1/patients",
                        Some(json!({
                            "first_name": first_name,
                            "last_name": last_name,
                            "email": student.email,
                            "nu_control": student.numero_control,
                            "assigned_psychologist": staff_id,
                        })),
                        Some(SupabaseClient::return_representation()),
                    )
                    .await?
            }
        };

        written
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Patient write returned no rows".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("ANA SOFIA LOPEZ GARCIA"),
            ("ANA".to_string(), "SOFIA LOPEZ GARCIA".to_string())
        );
        assert_eq!(split_name("  PEDRO   PEREZ "), ("PEDRO".to_string(), "PEREZ".to_string()));
        assert_eq!(split_name("MADONNA"), ("MADONNA".to_string(), "MADONNA".to_string()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }
}
