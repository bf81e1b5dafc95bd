// SPDX-License-Identifier: Apache-2.0

use chrono::{TimeZone, Utc};
use regslip_model::{
    Email, FullName, Gender, IdNumber, ImageRef, PhoneNumber, Registrant, RosterId, Submission,
};

#[test]
fn registrant_serializes_field_newtypes_transparently() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("timestamp");
    let registrant = Registrant::from_submission(
        Submission::new(
            FullName::parse("Jane Doe").expect("name"),
            IdNumber::parse("ytc/25/001").expect("id"),
            Email::parse("jane@x.com").expect("email"),
            PhoneNumber::parse("+234800000000").expect("phone"),
            Gender::Female,
            Some(ImageRef::parse("data:image/png;base64,AAAA").expect("image")),
        ),
        RosterId::assign("ytc", 2025, 1).expect("roster id"),
        now,
    );

    let value = serde_json::to_value(&registrant).expect("serialize registrant");
    assert_eq!(value["roster_id"], "ytc/25/001");
    assert_eq!(value["full_name"], "Jane Doe");
    assert_eq!(value["gender"], "female");
    assert_eq!(value["image"], "data:image/png;base64,AAAA");

    let back: Registrant = serde_json::from_value(value).expect("deserialize registrant");
    assert_eq!(back, registrant);
}

#[test]
fn gender_wire_form_is_lowercase() {
    assert_eq!(
        serde_json::to_string(&Gender::Other).expect("serialize gender"),
        "\"other\""
    );
    let g: Gender = serde_json::from_str("\"male\"").expect("deserialize gender");
    assert_eq!(g, Gender::Male);
}
