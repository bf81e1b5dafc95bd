// SPDX-License-Identifier: Apache-2.0

use regslip_model::{
    Email, FullName, Gender, IdNumber, ImageRef, PhoneNumber, Registrant, Submission,
};

use crate::dto::{FieldErrorDto, RegistrantDto, SubmitRegistrantDto};

/// Parses a submission body into a validated domain `Submission`. Every
/// field is checked so the response can report all failures at once, not
/// just the first.
pub fn parse_submission(dto: &SubmitRegistrantDto) -> Result<Submission, Vec<FieldErrorDto>> {
    let mut field_errors = Vec::new();

    let full_name = collect(FullName::parse(&dto.full_name), &mut field_errors);
    let id_number = collect(IdNumber::parse(&dto.id_number), &mut field_errors);
    let email = collect(Email::parse(&dto.email), &mut field_errors);
    let phone_number = collect(PhoneNumber::parse(&dto.phone_number), &mut field_errors);
    let gender = collect(Gender::parse(&dto.gender), &mut field_errors);
    let image = match dto.image_url.as_deref() {
        None | Some("") => Some(None),
        Some(raw) => collect(ImageRef::parse(raw), &mut field_errors).map(Some),
    };

    match (full_name, id_number, email, phone_number, gender, image) {
        (Some(full_name), Some(id_number), Some(email), Some(phone), Some(gender), Some(image)) => {
            Ok(Submission::new(
                full_name, id_number, email, phone, gender, image,
            ))
        }
        _ => Err(field_errors),
    }
}

fn collect<T>(
    parsed: Result<T, regslip_model::ParseError>,
    field_errors: &mut Vec<FieldErrorDto>,
) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(err) => {
            field_errors.push(FieldErrorDto {
                field: err.field().to_string(),
                reason: err.to_string(),
            });
            None
        }
    }
}

#[must_use]
pub fn registrant_dto(registrant: &Registrant) -> RegistrantDto {
    RegistrantDto {
        id: registrant.roster_id.as_str().to_string(),
        full_name: registrant.full_name.as_str().to_string(),
        id_number: registrant.id_number.as_str().to_string(),
        email: registrant.email.as_str().to_string(),
        phone_number: registrant.phone_number.as_str().to_string(),
        gender: registrant.gender.as_str().to_string(),
        image_url: registrant.image.as_ref().map(|i| i.as_str().to_string()),
        created_at: registrant.created_at,
    }
}
