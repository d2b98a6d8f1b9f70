use contracts::domain::a007_reservation::{
    CreateReservationDto, Reservation, ReservationFilters, UpdateReservationDto,
};
use serde::de::IgnoredAny;

use crate::shared::crud::{fetch_list, Resource};
use crate::shared::error::ApiError;
use crate::shared::http::{ApiClient, ApiRequest};
use crate::system::users::api::USERS;

const RESERVATIONS: Resource<Reservation> = Resource::new("reservation");

pub async fn list_reservations(
    client: &ApiClient,
    filters: &ReservationFilters,
) -> Result<Vec<Reservation>, ApiError> {
    RESERVATIONS.list_filtered(client, filters).await
}

pub async fn fetch_reservation(client: &ApiClient, id: &str) -> Result<Reservation, ApiError> {
    RESERVATIONS.get(client, id).await
}

pub async fn create_reservation(
    client: &ApiClient,
    dto: &CreateReservationDto,
) -> Result<Reservation, ApiError> {
    RESERVATIONS.create(client, dto).await
}

pub async fn update_reservation(
    client: &ApiClient,
    id: &str,
    dto: &UpdateReservationDto,
) -> Result<Reservation, ApiError> {
    RESERVATIONS.update(client, id, dto).await
}

pub async fn delete_reservation(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    RESERVATIONS.delete(client, id).await
}

pub async fn bulk_create_reservations(
    client: &ApiClient,
    dtos: &[CreateReservationDto],
) -> Result<Vec<Reservation>, ApiError> {
    RESERVATIONS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_reservations(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    RESERVATIONS.bulk_delete(client, ids.iter().cloned()).await
}

/// Reservations of one user with their sessions
pub async fn get_user_reservations(
    client: &ApiClient,
    user_id: &str,
) -> Result<Vec<Reservation>, ApiError> {
    fetch_list(client, ApiRequest::get(USERS.nested(user_id, "reservations"))).await
}

/// Cancel keeps the record; the backend flips its status
pub async fn cancel_reservation(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client
        .request::<IgnoredAny>(ApiRequest::post(RESERVATIONS.action(id, "cancel")))
        .await
        .map(|_| ())
}
