use kexplist::types::Track;
use kexplist::utils::*;

fn track(artist: &str, title: &str, id: Option<&str>) -> Track {
    Track {
        catalog_id: id.map(str::to_string),
        ..Track::new(Some(artist), Some(title))
    }
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Same input produces same output
    assert_eq!(challenge, generate_code_challenge(verifier));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // SHA256 digest, base64url without padding
    assert_eq!(challenge.len(), 43);
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_matched_ids_keeps_order_and_drops_unmatched() {
    let tracks = vec![
        track("A", "1", Some("x")),
        track("B", "2", None),
        track("C", "3", Some("y")),
    ];

    assert_eq!(matched_ids(&tracks), vec!["x", "y"]);
}

#[test]
fn test_track_uri() {
    assert_eq!(track_uri("spot123"), "spotify:track:spot123");
}

#[test]
fn test_token_file_name_is_path_safe() {
    assert_eq!(token_file_name("alice"), "alice.token.json");
    assert_eq!(token_file_name("../evil/user"), ".._evil_user.token.json");
}

#[test]
fn test_search_query_needs_artist_and_title() {
    assert_eq!(
        Track::new(Some("Artist A"), Some("Song 1")).search_query(),
        Some("Artist A Song 1".to_string())
    );
    assert_eq!(Track::new(None, Some("Song 2")).search_query(), None);
    assert_eq!(Track::new(Some("Artist A"), None).search_query(), None);
}

#[test]
fn test_track_display_marks_missing_fields() {
    assert_eq!(
        Track::new(None, Some("Song 2")).to_string(),
        "None - Song 2"
    );
}
