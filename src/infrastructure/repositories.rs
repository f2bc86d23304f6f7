//! DB Repository abstractions

use crate::core::ids;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    Admin, AdminUpdate, Appointment, AppointmentStatus, AppointmentWithParties, Client,
    ClientUpdate, NewAdmin, NewClient, PaymentStatus,
};
use crate::infrastructure::traits::{
    AdminRepository, AppointmentRepository, ClientRepository, NewAppointment,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use di::{Ref, injectable};
use uuid::Uuid;

/// Increment-and-fetch for a named counter as one statement, so two
/// concurrent callers can never observe the same sequence value.
pub async fn next_sequence<'e, E>(executor: E, counter: &str) -> Result<i64, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let (seq,): (i64,) = sqlx::query_as(
        "INSERT INTO counters (name, seq) VALUES (?, 1)
         ON CONFLICT (name) DO UPDATE SET seq = seq + 1
         RETURNING seq",
    )
    .bind(counter)
    .fetch_one(executor)
    .await?;

    Ok(seq)
}

#[injectable(ClientRepository)]
pub struct DbClientRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ClientRepository for DbClientRepository {
    async fn create(&self, new_client: NewClient) -> Result<Client, sqlx::Error> {
        let mut tx = self.connection.begin().await?;

        let seq = next_sequence(&mut *tx, ids::CLIENT_COUNTER).await?;

        let client: Client = sqlx::query_as(
            "INSERT INTO clients (id, client_id, name, email, phone, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(ids::client_id(seq))
        .bind(&new_client.name)
        .bind(&new_client.email)
        .bind(&new_client.phone)
        .bind(&new_client.password_hash)
        .bind("Client")
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(client)
    }

    async fn find_by_public_id(&self, client_id: &str) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM clients WHERE client_id = ?")
            .bind(client_id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM clients WHERE email = ?")
            .bind(email)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ClientUpdate,
    ) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE clients SET
                 name = COALESCE(?, name),
                 email = COALESCE(?, email),
                 phone = COALESCE(?, phone)
             WHERE id = ? RETURNING *",
        )
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone)
        .bind(id)
        .fetch_optional(&**self.connection)
        .await
    }
}

#[injectable(AdminRepository)]
pub struct DbAdminRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl AdminRepository for DbAdminRepository {
    async fn create(&self, new_admin: NewAdmin) -> Result<Admin, sqlx::Error> {
        let mut tx = self.connection.begin().await?;

        let seq = next_sequence(&mut *tx, ids::ADMIN_COUNTER).await?;

        let admin: Admin = sqlx::query_as(
            "INSERT INTO admins (id, admin_id, name, email, phone, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(ids::admin_id(seq))
        .bind(&new_admin.name)
        .bind(&new_admin.email)
        .bind(&new_admin.phone)
        .bind(&new_admin.password_hash)
        .bind("Admin")
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(admin)
    }

    async fn find_by_public_id(&self, admin_id: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM admins WHERE admin_id = ?")
            .bind(admin_id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: AdminUpdate,
    ) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE admins SET
                 name = COALESCE(?, name),
                 email = COALESCE(?, email),
                 phone = COALESCE(?, phone),
                 specialty = COALESCE(?, specialty),
                 description = COALESCE(?, description),
                 fee = COALESCE(?, fee),
                 experience = COALESCE(?, experience),
                 famous_for = COALESCE(?, famous_for),
                 working_days = COALESCE(?, working_days),
                 working_hours = COALESCE(?, working_hours),
                 break_time = COALESCE(?, break_time)
             WHERE id = ? RETURNING *",
        )
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.specialty)
        .bind(update.description)
        .bind(update.fee)
        .bind(update.experience)
        .bind(update.famous_for)
        .bind(update.working_days)
        .bind(update.working_hours)
        .bind(update.break_time)
        .bind(id)
        .fetch_optional(&**self.connection)
        .await
    }

    async fn list_all(&self) -> Result<Vec<Admin>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM admins ORDER BY admin_id ASC")
            .fetch_all(&**self.connection)
            .await
    }
}

const WITH_PARTIES: &str = "SELECT a.*,
        c.client_id AS client_public_id, c.name AS client_name,
        c.email AS client_email, c.phone AS client_phone,
        d.admin_id AS admin_public_id, d.name AS admin_name,
        d.specialty AS admin_specialty
     FROM appointments a
     JOIN clients c ON c.id = a.client
     JOIN admins d ON d.id = a.admin";

#[injectable(AppointmentRepository)]
pub struct DbAppointmentRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl AppointmentRepository for DbAppointmentRepository {
    async fn insert_if_slot_free(
        &self,
        new: NewAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let mut tx = self.connection.begin().await?;

        let seq = next_sequence(&mut *tx, ids::APPOINTMENT_COUNTER).await?;
        let now = Utc::now();

        // The overlap guard and the insert are one statement; SQLite
        // serializes writers, so the loser of a same-slot race inserts
        // nothing and we roll its sequence increment back.
        let inserted: Option<Appointment> = sqlx::query_as(
            "INSERT INTO appointments
                 (id, appointment_id, client, admin, start_time, end_time, purpose,
                  payment_id, payment_status, status, cancel_reason, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE admin = ? AND status = 'Upcoming'
                   AND start_time < ? AND end_time > ?
             )
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(ids::appointment_id(seq))
        .bind(new.client)
        .bind(new.admin)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.purpose)
        .bind(&new.payment_id)
        .bind(PaymentStatus::Pending)
        .bind(AppointmentStatus::Upcoming)
        .bind(now)
        .bind(now)
        .bind(new.admin)
        .bind(new.end_time)
        .bind(new.start_time)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(appointment) => {
                tx.commit().await?;
                Ok(Some(appointment))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    async fn reschedule_if_slot_free(
        &self,
        id: Uuid,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments
             SET start_time = ?, end_time = ?, status = 'Rescheduled', updated_at = ?
             WHERE id = ?
               AND NOT EXISTS (
                 SELECT 1 FROM appointments other
                 WHERE other.admin = appointments.admin
                   AND other.id <> appointments.id
                   AND other.status = 'Upcoming'
                   AND other.start_time < ? AND other.end_time > ?
             )",
        )
        .bind(start_time)
        .bind(end_time)
        .bind(Utc::now())
        .bind(id)
        .bind(end_time)
        .bind(start_time)
        .execute(&**self.connection)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_cancelled(&self, id: Uuid, reason: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE appointments
             SET status = 'Cancelled', cancel_reason = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .execute(&**self.connection)
        .await?;

        Ok(())
    }

    async fn find_by_public_id(
        &self,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM appointments WHERE appointment_id = ?")
            .bind(appointment_id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn fetch_with_parties(
        &self,
        id: Uuid,
    ) -> Result<Option<AppointmentWithParties>, sqlx::Error> {
        sqlx::query_as(&format!("{WITH_PARTIES} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn list_for_client(
        &self,
        client: Uuid,
    ) -> Result<Vec<AppointmentWithParties>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{WITH_PARTIES} WHERE a.client = ? ORDER BY datetime(a.start_time) ASC"
        ))
        .bind(client)
        .fetch_all(&**self.connection)
        .await
    }

    async fn list_for_admin(
        &self,
        admin: Uuid,
    ) -> Result<Vec<AppointmentWithParties>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{WITH_PARTIES} WHERE a.admin = ? ORDER BY datetime(a.start_time) ASC"
        ))
        .bind(admin)
        .fetch_all(&**self.connection)
        .await
    }

    async fn list_upcoming_for_admin(&self, admin: Uuid) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM appointments
             WHERE admin = ? AND status = 'Upcoming'
             ORDER BY datetime(start_time) ASC",
        )
        .bind(admin)
        .fetch_all(&**self.connection)
        .await
    }
}
