//! Stay arithmetic and the WhatsApp booking hand-off

use crate::{Result, TravelError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whole nights between two dates, in either order; 0 if a date is missing.
#[must_use]
pub fn nights_between(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> u32 {
    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => {
            let days = (check_out - check_in).num_days().unsigned_abs();
            u32::try_from(days).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

fn parse_date(raw: &str, field: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| TravelError::validation(format!("invalid {field} date '{raw}': {e}")))
}

/// Nights between two ISO `YYYY-MM-DD` dates. Empty input counts as missing.
pub fn parse_and_count(check_in: &str, check_out: &str) -> Result<u32> {
    let nights = nights_between(
        parse_date(check_in, "check-in")?,
        parse_date(check_out, "check-out")?,
    );
    debug!("{} night(s) between '{}' and '{}'", nights, check_in, check_out);
    Ok(nights)
}

#[must_use]
pub fn total_price(nights: u32, price_per_night: f64) -> f64 {
    f64::from(nights) * price_per_night
}

/// What the guest is asking to book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Property,
    Package,
}

/// Everything the booking form collects, rendered into a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub kind: BookingKind,
    pub listing_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    /// Nightly rate for properties, package price for packages (USD)
    pub price: f64,
    /// Overrides `nights * price` when set
    #[serde(default)]
    pub total_override: Option<f64>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl BookingSummary {
    #[must_use]
    pub fn nights(&self) -> u32 {
        nights_between(Some(self.check_in), Some(self.check_out))
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.total_override
            .filter(|total| *total != 0.0)
            .unwrap_or_else(|| total_price(self.nights(), self.price))
    }

    fn guest_block(&self) -> String {
        let mut block = format!(
            "👤 *Guest Information:*\n• Name: {}\n• Email: {}\n• Phone: {}\n\n",
            self.customer_name, self.customer_email, self.customer_phone
        );
        if let Some(requests) = self.special_requests.as_deref().filter(|r| !r.is_empty()) {
            block.push_str(&format!("📝 *Special Requests:*\n{requests}\n"));
        }
        block
    }

    /// The pre-filled chat message.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            BookingKind::Property => format!(
                "Hi! I'm interested in booking {name}.\n\n\
                 📋 *Booking Details:*\n\
                 • Check-in: {check_in}\n\
                 • Check-out: {check_out}\n\
                 • Nights: {nights}\n\
                 • Guests: {guests}\n\
                 • Price per night: ${price}\n\
                 • Total: ${total}\n\n\
                 {guest}\n\
                 Please let me know if this property is available for these dates and help me with the booking process. Thank you!",
                name = self.listing_name,
                check_in = self.check_in,
                check_out = self.check_out,
                nights = self.nights(),
                guests = self.guests,
                price = self.price,
                total = self.total(),
                guest = self.guest_block(),
            ),
            BookingKind::Package => format!(
                "Hi! I'm interested in booking the {name} package.\n\n\
                 📋 *Package Details:*\n\
                 • Package: {name}\n\
                 • Check-in: {check_in}\n\
                 • Check-out: {check_out}\n\
                 • Guests: {guests}\n\
                 • Price: ${price}\n\n\
                 {guest}\n\
                 Please let me know if this package is available and help me with the booking process. Thank you!",
                name = self.listing_name,
                check_in = self.check_in,
                check_out = self.check_out,
                guests = self.guests,
                price = self.price,
                guest = self.guest_block(),
            ),
        }
    }

    /// `wa.me` link opening a chat with `phone` and the message filled in.
    #[must_use]
    pub fn whatsapp_url(&self, phone: &str) -> String {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        format!(
            "https://wa.me/{}?text={}",
            digits,
            urlencoding::encode(&self.message())
        )
    }
}
