use rand::Rng;
use std::collections::BTreeMap;

use crate::core::types::RegistrationData;

/// Field name -> submitted value, as a handler would post it
pub type FormPayload = BTreeMap<&'static str, String>;

const PASSWORD_CHARS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";

const PLACEHOLDER_ADDRESS: &str = "123 Test Street, Test City";

/// Synthesize placeholder data for one attempt around the selected phone number
pub fn placeholder_data(phone_number: &str) -> RegistrationData {
    placeholder_data_with(&mut rand::thread_rng(), phone_number)
}

pub fn placeholder_data_with<R: Rng + ?Sized>(rng: &mut R, phone_number: &str) -> RegistrationData {
    RegistrationData {
        phone_number: phone_number.to_string(),
        email: Some(format!("user{}@example.com", rng.gen_range(0..10_000))),
        first_name: Some(format!("User{}", rng.gen_range(0..1_000))),
        last_name: Some(format!("Test{}", rng.gen_range(0..1_000))),
        address: Some(PLACEHOLDER_ADDRESS.to_string()),
        password: Some(format!("Password{}!", rng.gen_range(0..1_000))),
    }
}

/// 12 random characters from letters, digits and `!@#$%`
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..12)
        .map(|_| PASSWORD_CHARS[rng.gen_range(0..PASSWORD_CHARS.len())] as char)
        .collect()
}

/// YYYY-MM-DD between 1970 and 1999, day capped at 28
pub fn generate_birth_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    let year = rng.gen_range(1970..2000);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    format!("{}-{:02}-{:02}", year, month, day)
}

fn password_or_generated<R: Rng + ?Sized>(rng: &mut R, data: &RegistrationData) -> String {
    data.password
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| generate_password(rng))
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// Payload builders for the built-in handlers.

pub fn sekaimon_form(data: &RegistrationData) -> FormPayload {
    FormPayload::from([
        ("phone", data.phone_number.clone()),
        ("country_code", "+81".to_string()),
    ])
}

pub fn qoo10_form(data: &RegistrationData) -> FormPayload {
    let mut rng = rand::thread_rng();
    FormPayload::from([
        ("email", opt(&data.email)),
        ("phone", data.phone_number.clone()),
        ("firstName", opt(&data.first_name)),
        ("lastName", opt(&data.last_name)),
        ("password", password_or_generated(&mut rng, data)),
        ("sellerType", "individual".to_string()),
    ])
}

pub fn city_heaven_form(data: &RegistrationData) -> FormPayload {
    FormPayload::from([
        ("phone", data.phone_number.clone()),
        ("region", "tokyo".to_string()),
    ])
}

pub fn mixi_form(data: &RegistrationData) -> FormPayload {
    let mut rng = rand::thread_rng();
    FormPayload::from([
        ("email", opt(&data.email)),
        ("phone", data.phone_number.clone()),
        ("nickname", format!("{}{}", opt(&data.first_name), rng.gen_range(0..1_000))),
        ("password", password_or_generated(&mut rng, data)),
        ("birthYear", rng.gen_range(1990..2010).to_string()),
    ])
}

pub fn zexy_enmusubi_form(data: &RegistrationData) -> FormPayload {
    let mut rng = rand::thread_rng();
    let gender = if rng.gen_bool(0.5) { "male" } else { "female" };
    FormPayload::from([
        ("phone", data.phone_number.clone()),
        ("gender", gender.to_string()),
        ("age", rng.gen_range(25..40).to_string()),
    ])
}

pub fn suntory_form(data: &RegistrationData) -> FormPayload {
    let mut rng = rand::thread_rng();
    FormPayload::from([
        ("email", opt(&data.email)),
        ("phone", data.phone_number.clone()),
        ("firstName", opt(&data.first_name)),
        ("lastName", opt(&data.last_name)),
        ("password", password_or_generated(&mut rng, data)),
        ("birthDate", generate_birth_date(&mut rng)),
    ])
}

/// Payload for sites without a dedicated handler
pub fn generic_form(data: &RegistrationData, with_phone: bool, with_email: bool) -> FormPayload {
    let mut payload = FormPayload::new();
    if with_phone {
        payload.insert("phone", data.phone_number.clone());
    }
    if with_email {
        let mut rng = rand::thread_rng();
        payload.insert("email", opt(&data.email));
        payload.insert("firstName", opt(&data.first_name));
        payload.insert("lastName", opt(&data.last_name));
        payload.insert("password", password_or_generated(&mut rng, data));
    }
    payload
}
