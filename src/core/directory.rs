//! Identifier resolution shared by the REST handlers and the chat flows.

use crate::core::error::Error;
use crate::core::traits::DirectoryService;
use crate::infrastructure::entities::{Admin, Appointment, Client};
use crate::infrastructure::traits::{AdminRepository, AppointmentRepository, ClientRepository};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(DirectoryService)]
pub struct MyDirectoryService {
    clients: Ref<dyn ClientRepository>,
    admins: Ref<dyn AdminRepository>,
    appointments: Ref<dyn AppointmentRepository>,
}

#[async_trait]
impl DirectoryService for MyDirectoryService {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, Error> {
        Ok(self.clients.find_by_public_id(client_id).await?)
    }

    async fn find_admin(&self, admin_id: &str) -> Result<Option<Admin>, Error> {
        Ok(self.admins.find_by_public_id(admin_id).await?)
    }

    async fn find_appointment(&self, reference: &str) -> Result<Option<Appointment>, Error> {
        // A reference that parses as a UUID is an internal one.
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(self.appointments.find_by_ref(id).await?);
        }

        Ok(self.appointments.find_by_public_id(reference).await?)
    }

    async fn find_appointment_by_public_id(
        &self,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, Error> {
        Ok(self.appointments.find_by_public_id(appointment_id).await?)
    }
}
