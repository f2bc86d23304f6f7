//! Multi-turn conversation flows for the two chat surfaces.
//!
//! A session is absent until the first recognized intent. Each state
//! carries exactly the data accumulated so far, so malformed input can be
//! re-prompted without touching earlier selections, and later steps never
//! re-resolve identifiers.

use crate::core::error::Error;
use crate::core::traits::{
    AdminChatService, CancelOutcome, ChatService, DirectoryService, SchedulingService,
    SessionStore,
};
use crate::core::validate::{parse_date, parse_time};
use crate::infrastructure::entities::{Admin, Appointment, AppointmentStatus};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use di::{Ref, injectable};

/// Flow positions with their accumulated selections.
#[derive(Debug, Clone)]
pub enum FlowState {
    CollectAdmin,
    CollectDate {
        admin: Admin,
    },
    CollectTime {
        admin: Admin,
        date: NaiveDate,
    },
    CollectPurpose {
        admin: Admin,
        date: NaiveDate,
        time: NaiveTime,
    },
    CollectReschedule,
    RescheduleDate {
        appointment: Appointment,
    },
    RescheduleTime {
        appointment: Appointment,
        date: NaiveDate,
    },
    CollectCancel,
    CollectCancelReason {
        appointment: Appointment,
    },
    CollectVip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Book,
    Reschedule,
    Cancel,
    Vip,
}

/// Case-insensitive keyword match, checked in a fixed order.
pub fn detect_intent(message: &str) -> Option<Intent> {
    let lowered = message.to_lowercase();
    if lowered.contains("book") {
        Some(Intent::Book)
    } else if lowered.contains("reschedule") {
        Some(Intent::Reschedule)
    } else if lowered.contains("cancel") {
        Some(Intent::Cancel)
    } else if lowered.contains("vip") {
        Some(Intent::Vip)
    } else {
        None
    }
}

fn vip_summary(admin_name: &str, upcoming: &[Appointment]) -> String {
    let mut reply = format!("VIP {admin_name} has upcoming appointments:\n");

    if upcoming.is_empty() {
        reply.push_str("No appointments booked yet. Fully available!");
    } else {
        for appointment in upcoming {
            reply.push_str(&format!(
                "- {} {} - {}\n",
                appointment.start_time.format("%Y-%m-%d"),
                appointment.start_time.format("%H:%M"),
                appointment.end_time.format("%H:%M"),
            ));
        }
    }

    reply
}

#[injectable(ChatService)]
pub struct MyChatService {
    directory: Ref<dyn DirectoryService>,
    scheduling: Ref<dyn SchedulingService>,
    sessions: Ref<dyn SessionStore>,
}

impl MyChatService {
    async fn start_flow(&self, key: &str, message: &str) -> Result<String, Error> {
        match detect_intent(message) {
            Some(Intent::Book) => {
                self.sessions.set(key, FlowState::CollectAdmin).await;
                Ok("Great! Let's book an appointment. Please provide the admin ID of the \
                    person you want to book with."
                    .to_owned())
            }
            Some(Intent::Reschedule) => {
                self.sessions.set(key, FlowState::CollectReschedule).await;
                Ok("Sure! Please provide your appointment ID to reschedule.".to_owned())
            }
            Some(Intent::Cancel) => {
                self.sessions.set(key, FlowState::CollectCancel).await;
                Ok("Okay! Please provide your appointment ID to cancel.".to_owned())
            }
            Some(Intent::Vip) => {
                self.sessions.set(key, FlowState::CollectVip).await;
                Ok("Sure! Please provide the admin ID to check VIP availability.".to_owned())
            }
            None => Ok(
                "Hello! I can help you book, reschedule, cancel appointments, and check VIP \
                 availability. What would you like to do?"
                    .to_owned(),
            ),
        }
    }
}

#[async_trait]
impl ChatService for MyChatService {
    async fn respond(&self, client_id: &str, message: &str) -> Result<String, Error> {
        let Some(client) = self.directory.find_client(client_id).await? else {
            return Ok("User not found.".to_owned());
        };
        let msg = message.trim();

        let Some(state) = self.sessions.get(client_id).await else {
            return self.start_flow(client_id, msg).await;
        };

        match state {
            FlowState::CollectAdmin => match self.directory.find_admin(msg).await? {
                None => Ok("Invalid admin ID. Please provide a valid admin ID.".to_owned()),
                Some(admin) => {
                    self.sessions
                        .set(client_id, FlowState::CollectDate { admin })
                        .await;
                    Ok(
                        "Got it. Now please provide the date for the appointment (YYYY-MM-DD)."
                            .to_owned(),
                    )
                }
            },

            FlowState::CollectDate { admin } => match parse_date(msg) {
                None => Ok("Invalid date format. Please provide in YYYY-MM-DD format.".to_owned()),
                Some(date) => {
                    self.sessions
                        .set(client_id, FlowState::CollectTime { admin, date })
                        .await;
                    Ok(
                        "Thanks. Please provide the time for the appointment (HH:MM, 24-hour \
                         format)."
                            .to_owned(),
                    )
                }
            },

            FlowState::CollectTime { admin, date } => match parse_time(msg) {
                None => Ok("Invalid time format. Please provide in HH:MM, 24-hour format.".to_owned()),
                Some(time) => {
                    self.sessions
                        .set(client_id, FlowState::CollectPurpose { admin, date, time })
                        .await;
                    Ok("Almost done! Please provide the purpose of the appointment.".to_owned())
                }
            },

            FlowState::CollectPurpose { admin, date, time } => {
                match self
                    .scheduling
                    .book(&client, &admin, date, time, msg, None)
                    .await
                {
                    Ok(booked) => {
                        self.sessions.delete(client_id).await;
                        Ok(format!(
                            "Appointment booked successfully with {} on {} at {}. \
                             Appointment ID: {}",
                            admin.name,
                            date.format("%Y-%m-%d"),
                            time.format("%H:%M"),
                            booked.appointment.appointment_id
                        ))
                    }
                    Err(Error::Conflict(_)) => {
                        // Keep the admin and date; only the time needs to change.
                        self.sessions
                            .set(client_id, FlowState::CollectTime { admin, date })
                            .await;
                        Ok("This time slot is already booked. Please choose another.".to_owned())
                    }
                    Err(other) => Err(other),
                }
            }

            FlowState::CollectReschedule => {
                match self.directory.find_appointment_by_public_id(msg).await? {
                    None => Ok("Appointment not found.".to_owned()),
                    Some(appointment) => {
                        self.sessions
                            .set(client_id, FlowState::RescheduleDate { appointment })
                            .await;
                        Ok("Please provide the new date (YYYY-MM-DD) for your appointment."
                            .to_owned())
                    }
                }
            }

            FlowState::RescheduleDate { appointment } => match parse_date(msg) {
                None => Ok("Invalid date format.".to_owned()),
                Some(date) => {
                    self.sessions
                        .set(client_id, FlowState::RescheduleTime { appointment, date })
                        .await;
                    Ok("Please provide the new time (HH:MM, 24-hour format) for your appointment."
                        .to_owned())
                }
            },

            FlowState::RescheduleTime { appointment, date } => match parse_time(msg) {
                None => Ok("Invalid time format.".to_owned()),
                Some(time) => match self.scheduling.reschedule(&appointment, date, time).await {
                    Ok(updated) => {
                        self.sessions.delete(client_id).await;
                        Ok(format!(
                            "Appointment rescheduled successfully. Appointment ID: {}",
                            updated.appointment.appointment_id
                        ))
                    }
                    Err(Error::Conflict(_)) => {
                        Ok("Time slot already booked. Choose another time.".to_owned())
                    }
                    Err(other) => Err(other),
                },
            },

            FlowState::CollectCancel => {
                match self.directory.find_appointment_by_public_id(msg).await? {
                    None => Ok("Appointment not found.".to_owned()),
                    Some(appointment) => {
                        let outcome = self.scheduling.cancel(&appointment, None).await?;
                        self.sessions.delete(client_id).await;
                        Ok(match outcome {
                            CancelOutcome::Cancelled(cancelled) => format!(
                                "Appointment cancelled successfully. Appointment ID: {}",
                                cancelled.appointment.appointment_id
                            ),
                            CancelOutcome::AlreadyCancelled(unchanged) => format!(
                                "Appointment {} is already cancelled.",
                                unchanged.appointment.appointment_id
                            ),
                        })
                    }
                }
            }

            FlowState::CollectVip => match self.directory.find_admin(msg).await? {
                None => Ok("Admin not found.".to_owned()),
                Some(admin) => {
                    let upcoming = self.scheduling.upcoming_for_admin(&admin).await?;
                    self.sessions.delete(client_id).await;
                    Ok(vip_summary(&admin.name, &upcoming))
                }
            },

            // Admin-only state; a session from the other surface cannot
            // reach it, so treat it as stale and start over.
            FlowState::CollectCancelReason { .. } => {
                self.sessions.delete(client_id).await;
                self.start_flow(client_id, msg).await
            }
        }
    }
}

#[injectable(AdminChatService)]
pub struct MyAdminChatService {
    directory: Ref<dyn DirectoryService>,
    scheduling: Ref<dyn SchedulingService>,
    sessions: Ref<dyn SessionStore>,
}

impl MyAdminChatService {
    async fn start_flow(&self, key: &str, message: &str) -> Result<String, Error> {
        match detect_intent(message) {
            Some(Intent::Reschedule) => {
                self.sessions.set(key, FlowState::CollectReschedule).await;
                Ok("Please provide the Appointment ID to reschedule.".to_owned())
            }
            Some(Intent::Cancel) => {
                self.sessions.set(key, FlowState::CollectCancel).await;
                Ok("Please provide the Appointment ID to cancel.".to_owned())
            }
            _ => Ok(
                "Hello! I can help you cancel or reschedule appointments. Please type \
                 'reschedule' or 'cancel'."
                    .to_owned(),
            ),
        }
    }
}

#[async_trait]
impl AdminChatService for MyAdminChatService {
    async fn respond(&self, admin_id: &str, message: &str) -> Result<String, Error> {
        if self.directory.find_admin(admin_id).await?.is_none() {
            return Ok("Admin not found.".to_owned());
        }
        let msg = message.trim();

        let Some(state) = self.sessions.get(admin_id).await else {
            return self.start_flow(admin_id, msg).await;
        };

        match state {
            FlowState::CollectReschedule => {
                match self.directory.find_appointment_by_public_id(msg).await? {
                    None => Ok(format!("Appointment not found: {msg}")),
                    Some(appointment) => {
                        self.sessions
                            .set(admin_id, FlowState::RescheduleDate { appointment })
                            .await;
                        Ok("Please provide the new date (YYYY-MM-DD) for your appointment."
                            .to_owned())
                    }
                }
            }

            FlowState::RescheduleDate { appointment } => match parse_date(msg) {
                None => Ok("Invalid date format. Use YYYY-MM-DD.".to_owned()),
                Some(date) => {
                    self.sessions
                        .set(admin_id, FlowState::RescheduleTime { appointment, date })
                        .await;
                    Ok("Please provide the new time (HH:MM, 24-hour format).".to_owned())
                }
            },

            FlowState::RescheduleTime { appointment, date } => match parse_time(msg) {
                None => Ok("Invalid time format. Use HH:MM 24-hour format.".to_owned()),
                Some(time) => match self.scheduling.reschedule(&appointment, date, time).await {
                    Ok(updated) => {
                        self.sessions.delete(admin_id).await;
                        Ok(format!(
                            "Appointment rescheduled successfully. Appointment ID: {}",
                            updated.appointment.appointment_id
                        ))
                    }
                    Err(Error::Conflict(_)) => {
                        Ok("Time slot already booked. Choose another time.".to_owned())
                    }
                    Err(other) => Err(other),
                },
            },

            FlowState::CollectCancel => {
                match self.directory.find_appointment_by_public_id(msg).await? {
                    None => Ok(format!("Appointment not found: {msg}")),
                    Some(appointment) => {
                        if appointment.status == AppointmentStatus::Cancelled {
                            self.sessions.delete(admin_id).await;
                            return Ok(format!("Appointment {msg} is already cancelled."));
                        }

                        self.sessions
                            .set(admin_id, FlowState::CollectCancelReason { appointment })
                            .await;
                        Ok("Please provide a reason for cancellation.".to_owned())
                    }
                }
            }

            FlowState::CollectCancelReason { appointment } => {
                let outcome = self.scheduling.cancel(&appointment, Some(msg)).await?;
                self.sessions.delete(admin_id).await;
                Ok(match outcome {
                    CancelOutcome::Cancelled(cancelled) => format!(
                        "Appointment cancelled successfully. Appointment ID: {}\nReason: {msg}",
                        cancelled.appointment.appointment_id
                    ),
                    CancelOutcome::AlreadyCancelled(unchanged) => format!(
                        "Appointment {} is already cancelled.",
                        unchanged.appointment.appointment_id
                    ),
                })
            }

            // Client-only states are unreachable from this surface.
            _ => {
                self.sessions.delete(admin_id).await;
                self.start_flow(admin_id, msg).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn intent_keywords_are_case_insensitive_substrings() {
        assert_eq!(detect_intent("I'd like to BOOK something"), Some(Intent::Book));
        assert_eq!(detect_intent("reschedule please"), Some(Intent::Reschedule));
        assert_eq!(detect_intent("Cancel it"), Some(Intent::Cancel));
        assert_eq!(detect_intent("vip availability?"), Some(Intent::Vip));
        assert_eq!(detect_intent("hello there"), None);
    }

    #[test]
    fn book_wins_over_later_keywords() {
        assert_eq!(detect_intent("book or cancel"), Some(Intent::Book));
    }

    #[test]
    fn vip_summary_lists_slots_in_order() {
        let start = NaiveDateTime::parse_from_str("2025-03-10 09:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let appointment = Appointment {
            id: uuid::Uuid::new_v4(),
            appointment_id: "AP-08051301".to_owned(),
            client: uuid::Uuid::new_v4(),
            admin: uuid::Uuid::new_v4(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            purpose: "checkup".to_owned(),
            payment_id: String::new(),
            payment_status: crate::infrastructure::entities::PaymentStatus::Pending,
            status: crate::infrastructure::entities::AppointmentStatus::Upcoming,
            cancel_reason: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let reply = vip_summary("Dana", &[appointment]);
        assert!(reply.starts_with("VIP Dana has upcoming appointments:"));
        assert!(reply.contains("2025-03-10 09:00 - 09:30"));
    }

    #[test]
    fn vip_summary_reports_full_availability() {
        let reply = vip_summary("Dana", &[]);
        assert!(reply.contains("Fully available!"));
    }
}
