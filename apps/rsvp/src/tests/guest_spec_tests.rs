use super::*;

#[test]
fn parses_accepting_guest_with_events_and_diet() {
    let spec: GuestSpec = "Jane|Doe|accept|ceremony+reception|vegetarian"
        .parse()
        .unwrap();
    assert_eq!(spec.first_name, "Jane");
    assert_eq!(spec.last_name, "Doe");
    assert!(spec.rsvp);
    assert_eq!(
        spec.events_attending,
        BTreeSet::from([EventTag::Ceremony, EventTag::Reception])
    );
    assert_eq!(spec.dietary_requirements, "vegetarian");
}

#[test]
fn decline_ignores_events_and_diet() {
    let spec: GuestSpec = "John|Roe|decline|ceremony|nuts".parse().unwrap();
    assert!(!spec.rsvp);
    assert!(spec.events_attending.is_empty());
    assert!(spec.dietary_requirements.is_empty());
    assert_eq!(
        spec.updates(),
        vec![
            GuestUpdate::FirstName("John".into()),
            GuestUpdate::LastName("Roe".into()),
            GuestUpdate::Rsvp(false),
        ]
    );
}

#[test]
fn optional_fields_may_be_omitted() {
    let spec: GuestSpec = "Ann|Lee|yes".parse().unwrap();
    assert!(spec.rsvp);
    assert!(spec.events_attending.is_empty());
    assert!(spec.dietary_requirements.is_empty());
}

#[test]
fn rejects_bad_input() {
    assert_eq!(
        "Ann".parse::<GuestSpec>(),
        Err(GuestSpecError::Shape("Ann".into()))
    );
    assert_eq!(
        "Ann|Lee|maybe".parse::<GuestSpec>(),
        Err(GuestSpecError::Attendance("maybe".into()))
    );
    assert_eq!(
        "Ann|Lee|accept|brunch".parse::<GuestSpec>(),
        Err(GuestSpecError::Event("brunch".into()))
    );
}
