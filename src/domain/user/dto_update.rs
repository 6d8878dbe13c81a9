/// Profile fields a user (or an admin) may edit. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}
