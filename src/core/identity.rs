//! Signup, login and profile maintenance.

use crate::core::error::Error;
use crate::core::traits::{CredentialService, IdentityService, Registration};
use crate::core::validate;
use crate::infrastructure::entities::{
    Admin, AdminUpdate, Client, ClientUpdate, NewAdmin, NewClient,
};
use crate::infrastructure::traits::{AdminRepository, ClientRepository};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::info;

fn check_contact(email: &str, phone: &str) -> Result<(), Error> {
    if !validate::is_valid_email(email) {
        return Err(Error::validation("Invalid email address"));
    }
    if !validate::is_valid_phone(phone) {
        return Err(Error::validation("Invalid phone number"));
    }
    Ok(())
}

#[injectable(IdentityService)]
pub struct MyIdentityService {
    clients: Ref<dyn ClientRepository>,
    admins: Ref<dyn AdminRepository>,
    credentials: Ref<dyn CredentialService>,
}

#[async_trait]
impl IdentityService for MyIdentityService {
    async fn register_client(
        &self,
        registration: Registration,
    ) -> Result<(Client, String), Error> {
        check_contact(&registration.email, &registration.phone)?;

        if self
            .clients
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(Error::validation("User already exists"));
        }

        let client = self
            .clients
            .create(NewClient {
                name: registration.name,
                email: registration.email,
                phone: registration.phone,
                password_hash: self.credentials.hash_password(&registration.password),
            })
            .await?;

        info!("registered client {}", client.client_id);
        let token = self.credentials.issue_token(&client.client_id);
        Ok((client, token))
    }

    async fn login_client(&self, email: &str, password: &str) -> Result<(Client, String), Error> {
        let client = self
            .clients
            .find_by_email(email)
            .await?
            .filter(|client| self.credentials.verify_password(password, &client.password_hash))
            .ok_or_else(|| Error::validation("Invalid credentials"))?;

        let token = self.credentials.issue_token(&client.client_id);
        Ok((client, token))
    }

    async fn register_admin(&self, registration: Registration) -> Result<(Admin, String), Error> {
        check_contact(&registration.email, &registration.phone)?;

        if self
            .admins
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(Error::validation("Admin already exists"));
        }

        let admin = self
            .admins
            .create(NewAdmin {
                name: registration.name,
                email: registration.email,
                phone: registration.phone,
                password_hash: self.credentials.hash_password(&registration.password),
            })
            .await?;

        info!("registered admin {}", admin.admin_id);
        let token = self.credentials.issue_token(&admin.admin_id);
        Ok((admin, token))
    }

    async fn login_admin(&self, email: &str, password: &str) -> Result<(Admin, String), Error> {
        let admin = self
            .admins
            .find_by_email(email)
            .await?
            .filter(|admin| self.credentials.verify_password(password, &admin.password_hash))
            .ok_or_else(|| Error::validation("Invalid credentials"))?;

        let token = self.credentials.issue_token(&admin.admin_id);
        Ok((admin, token))
    }

    async fn update_client_profile(
        &self,
        client: &Client,
        update: ClientUpdate,
    ) -> Result<Client, Error> {
        if let Some(email) = update.email.as_deref() {
            if email != client.email && self.clients.find_by_email(email).await?.is_some() {
                return Err(Error::validation("Email already in use"));
            }
        }

        self.clients
            .update_profile(client.id, update)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn update_admin_profile(
        &self,
        admin: &Admin,
        update: AdminUpdate,
    ) -> Result<Admin, Error> {
        if let Some(email) = update.email.as_deref() {
            if email != admin.email && self.admins.find_by_email(email).await?.is_some() {
                return Err(Error::validation("Email already in use"));
            }
        }

        self.admins
            .update_profile(admin.id, update)
            .await?
            .ok_or_else(|| Error::not_found("Admin not found"))
    }

    async fn list_admins(&self) -> Result<Vec<Admin>, Error> {
        Ok(self.admins.list_all().await?)
    }
}
