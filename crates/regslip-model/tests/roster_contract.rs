// SPDX-License-Identifier: Apache-2.0

use chrono::{TimeZone, Utc};
use regslip_model::{Email, FullName, Gender, IdNumber, PhoneNumber, Roster, Submission};

fn submission(name: &str, email: &str) -> Submission {
    Submission::new(
        FullName::parse(name).expect("full name"),
        IdNumber::parse("ytc/25/001").expect("id number"),
        Email::parse(email).expect("email"),
        PhoneNumber::parse("+234800000000").expect("phone"),
        Gender::Female,
        None,
    )
}

#[test]
fn nth_addition_receives_sequential_padded_id() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("timestamp");
    let mut roster = Roster::new("ytc").expect("roster");
    for n in 1..=12_u32 {
        let added = roster
            .add(submission("Jane Doe", "jane@x.com"), now)
            .expect("add");
        assert_eq!(added.roster_id.as_str(), format!("ytc/25/{n:03}"));
    }
    assert_eq!(roster.count(), 12);
}

#[test]
fn count_tracks_accepted_submissions_and_never_decreases() {
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).single().expect("timestamp");
    let mut roster = Roster::new("ytc").expect("roster");
    assert_eq!(roster.count(), 0);
    assert!(roster.last_added().is_none());

    roster.add(submission("A One", "a@x.com"), now).expect("add");
    roster.add(submission("B Two", "b@x.com"), now).expect("add");
    assert_eq!(roster.count(), 2);
    assert_eq!(
        roster.last_added().map(|r| r.full_name.as_str()),
        Some("B Two")
    );
}

#[test]
fn duplicate_submissions_are_accepted_with_distinct_ids() {
    let now = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).single().expect("timestamp");
    let mut roster = Roster::new("ytc").expect("roster");
    let first = roster
        .add(submission("Jane Doe", "jane@x.com"), now)
        .expect("first add")
        .roster_id
        .clone();
    let second = roster
        .add(submission("Jane Doe", "jane@x.com"), now)
        .expect("second add")
        .roster_id
        .clone();
    assert_ne!(first, second);
    assert_eq!(roster.count(), 2);
}

#[test]
fn user_supplied_id_number_is_stored_verbatim() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("timestamp");
    let mut roster = Roster::new("ytc").expect("roster");
    let added = roster
        .add(submission("Jane Doe", "jane@x.com"), now)
        .expect("add");
    // The user-supplied id and the generated roster id are separate fields.
    assert_eq!(added.id_number.as_str(), "ytc/25/001");
    assert_eq!(added.roster_id.as_str(), "ytc/25/001");
    let second = roster
        .add(submission("Jane Doe", "jane@x.com"), now)
        .expect("add again");
    assert_eq!(second.id_number.as_str(), "ytc/25/001");
    assert_eq!(second.roster_id.as_str(), "ytc/25/002");
}

#[test]
fn get_is_one_based_in_acceptance_order() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("timestamp");
    let mut roster = Roster::new("ytc").expect("roster");
    roster.add(submission("A One", "a@x.com"), now).expect("add");
    roster.add(submission("B Two", "b@x.com"), now).expect("add");
    assert_eq!(roster.get(1).map(|r| r.full_name.as_str()), Some("A One"));
    assert_eq!(roster.get(2).map(|r| r.full_name.as_str()), Some("B Two"));
    assert!(roster.get(0).is_none());
    assert!(roster.get(3).is_none());
}
