use serde::{Deserialize, Serialize};

/// What the client POSTs to create an address
///
/// `university_id` is the logical foreign key to the Customer atomic
/// service; the address itself is keyed by a server-generated UUID, so no
/// id appears here.
#[derive(Debug, Deserialize)]
pub struct AddressCreate {
    /// University ID of the customer this address belongs to (e.g. "UNI1234").
    pub university_id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl AddressCreate {
    /// Maximum stored length of `street`.
    pub const MAX_STREET_LEN: usize = 255;
    /// Maximum stored length of `city`.
    pub const MAX_CITY_LEN: usize = 100;
    /// Maximum stored length of `state`.
    pub const MAX_STATE_LEN: usize = 50;
    /// Maximum stored length of `postal_code`.
    pub const MAX_POSTAL_CODE_LEN: usize = 20;
    /// Maximum stored length of `country`.
    pub const MAX_COUNTRY_LEN: usize = 100;

    /// Validates all fields before the address is stored.
    ///
    /// Returns `Err` with a human-readable message on the first failing check.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_valid_university_id(&self.university_id) {
            return Err("university_id must be 2-4 uppercase letters followed by 3-4 digits (e.g. UNI1234)");
        }

        if self.street.is_empty() {
            return Err("street cannot be empty");
        }
        if self.street.len() > Self::MAX_STREET_LEN {
            return Err("street too long (max 255 characters)");
        }

        if self.city.is_empty() {
            return Err("city cannot be empty");
        }
        if self.city.len() > Self::MAX_CITY_LEN {
            return Err("city too long (max 100 characters)");
        }

        if self.state.is_empty() {
            return Err("state cannot be empty");
        }
        if self.state.len() > Self::MAX_STATE_LEN {
            return Err("state too long (max 50 characters)");
        }

        if self.postal_code.is_empty() {
            return Err("postal_code cannot be empty");
        }
        if self.postal_code.len() > Self::MAX_POSTAL_CODE_LEN {
            return Err("postal_code too long (max 20 characters)");
        }

        if self.country.is_empty() {
            return Err("country cannot be empty");
        }
        if self.country.len() > Self::MAX_COUNTRY_LEN {
            return Err("country too long (max 100 characters)");
        }

        Ok(())
    }
}

/// Checks the university ID shape: 2-4 uppercase ASCII letters followed by
/// 3-4 ASCII digits, nothing else.
fn is_valid_university_id(id: &str) -> bool {
    let letters = id.chars().take_while(|c| c.is_ascii_uppercase()).count();
    if !(2..=4).contains(&letters) {
        return false;
    }
    // The counted prefix is ASCII, so the char count is also a byte offset
    let rest = &id[letters..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    (3..=4).contains(&digits) && digits == rest.len()
}

/// Partial update for an address; supply only fields to change.
///
/// `university_id` is deliberately absent: the owning-customer link is
/// immutable once the address exists. Unknown JSON fields are ignored, so
/// a client sending it anyway gets no error and no effect.
#[derive(Debug, Default, Deserialize)]
pub struct AddressUpdate {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressUpdate {
    /// Validates the supplied fields; absent fields are not checked.
    ///
    /// An update with no fields at all is valid — the PATCH still succeeds
    /// and refreshes `updated_at`.
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(street) = &self.street {
            if street.is_empty() {
                return Err("street cannot be empty");
            }
            if street.len() > AddressCreate::MAX_STREET_LEN {
                return Err("street too long (max 255 characters)");
            }
        }

        if let Some(city) = &self.city {
            if city.is_empty() {
                return Err("city cannot be empty");
            }
            if city.len() > AddressCreate::MAX_CITY_LEN {
                return Err("city too long (max 100 characters)");
            }
        }

        if let Some(state) = &self.state {
            if state.is_empty() {
                return Err("state cannot be empty");
            }
            if state.len() > AddressCreate::MAX_STATE_LEN {
                return Err("state too long (max 50 characters)");
            }
        }

        if let Some(postal_code) = &self.postal_code {
            if postal_code.is_empty() {
                return Err("postal_code cannot be empty");
            }
            if postal_code.len() > AddressCreate::MAX_POSTAL_CODE_LEN {
                return Err("postal_code too long (max 20 characters)");
            }
        }

        if let Some(country) = &self.country {
            if country.is_empty() {
                return Err("country cannot be empty");
            }
            if country.len() > AddressCreate::MAX_COUNTRY_LEN {
                return Err("country too long (max 100 characters)");
            }
        }

        Ok(())
    }
}

/// Raw row returned by SQLx queries against the `addresses` table.
#[derive(Debug, sqlx::FromRow)]
pub struct AddressRow {
    pub address_id: String,
    pub university_id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    /// RFC 3339 UTC, written once at insert.
    pub created_at: String,
    /// RFC 3339 UTC, rewritten on every successful update.
    pub updated_at: String,
}

/// Server representation of an address returned to clients.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address_id: String,
    pub university_id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AddressRow> for AddressResponse {
    fn from(row: AddressRow) -> Self {
        Self {
            address_id: row.address_id,
            university_id: row.university_id,
            street: row.street,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// JSON response returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Numeric status code mirrored into the body; 200 whenever the
    /// service can answer at all.
    pub status: u16,
    pub status_message: &'static str,
    /// RFC 3339 UTC timestamp taken when the probe was answered.
    pub timestamp: String,
    /// The host's outbound IP address, or loopback when it cannot be
    /// determined.
    pub ip_address: String,
}

/// Simple Status Response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}
