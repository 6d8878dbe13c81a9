#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    /// Role name; validated against the closed role set by the service.
    pub role: String,
}
