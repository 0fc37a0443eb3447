//! The citizen column catalog.
//!
//! Every column of the `citizens` table is listed here exactly once, in table
//! order. The catalog is the server-side whitelist for dynamic statements: a
//! caller-supplied field name is only ever used as an identifier after it has
//! been resolved against [`CITIZEN_COLUMNS`]. Storage backends also derive
//! their DDL from it, so the schema and the whitelist cannot drift apart.

/// Name of the server-assigned primary key. Not part of the catalog.
pub const ID_COLUMN: &str = "id";

/// Columns returned by the slice (list) projection.
pub const SUMMARY_COLUMNS: [&str; 4] =
  ["first_name", "last_name", "birth_date", "address"];

// ─── Column kinds ────────────────────────────────────────────────────────────

/// The logical type of a citizen column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Text,
  Integer,
  Float,
  Boolean,
  /// A calendar date, exchanged as `YYYY-MM-DD`.
  Date,
  /// An unordered collection of free-text values.
  TextList,
  /// The identifier of another citizen. Not foreign-key enforced.
  CitizenRef,
  /// A collection of other citizens' identifiers. Not foreign-key enforced.
  CitizenRefList,
}

impl ColumnKind {
  /// Human-readable description used in validation messages.
  pub fn describe(self) -> &'static str {
    match self {
      Self::Text => "a string",
      Self::Integer => "an integer",
      Self::Float => "a number",
      Self::Boolean => "a boolean",
      Self::Date => "a date (YYYY-MM-DD)",
      Self::TextList => "an array of strings",
      Self::CitizenRef => "a citizen id",
      Self::CitizenRefList => "an array of citizen ids",
    }
  }

  pub fn is_list(self) -> bool {
    matches!(self, Self::TextList | Self::CitizenRefList)
  }
}

// ─── Column ──────────────────────────────────────────────────────────────────

/// One entry of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name:     &'static str,
  pub kind:     ColumnKind,
  /// `NOT NULL` in the store.
  pub required: bool,
}

const fn required(name: &'static str, kind: ColumnKind) -> Column {
  Column { name, kind, required: true }
}

const fn optional(name: &'static str, kind: ColumnKind) -> Column {
  Column { name, kind, required: false }
}

/// Look up a column by its exact name.
pub fn lookup(name: &str) -> Option<&'static Column> {
  CITIZEN_COLUMNS.iter().find(|c| c.name == name)
}

/// Iterate over the columns that must be present on insert.
pub fn required_columns() -> impl Iterator<Item = &'static Column> {
  CITIZEN_COLUMNS.iter().filter(|c| c.required)
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

use ColumnKind::{
  Boolean, CitizenRef, CitizenRefList, Date, Float, Integer, Text, TextList,
};

/// All writable citizen columns, in table order.
pub const CITIZEN_COLUMNS: &[Column] = &[
  // ── Identity ────────────────────────────────────────────────────────────
  required("first_name", Text),
  required("last_name", Text),
  optional("middle_name", Text),
  required("birth_date", Date),
  required("birth_place", Text),
  required("gender", Text),
  optional("profile_photo", Text),
  // ── Contact ─────────────────────────────────────────────────────────────
  required("address", Text),
  required("city", Text),
  required("country", Text),
  required("postal_code", Text),
  required("phone_number", Text),
  required("email", Text),
  required("citizenship", Text),
  required("nationality", Text),
  required("marital_status", Text),
  required("children_count", Integer),
  required("native_language", Text),
  optional("additional_languages", TextList),
  // ── Education & work ────────────────────────────────────────────────────
  required("education_level", Text),
  required("institution", Text),
  required("graduation_year", Integer),
  required("specialization", Text),
  optional("academic_degree", Text),
  optional("workplace", Text),
  optional("position", Text),
  optional("work_experience", Integer),
  optional("salary", Integer),
  optional("resume", Text),
  optional("skills", TextList),
  optional("hobbies", TextList),
  optional("interests", TextList),
  // ── Biometrics & health ─────────────────────────────────────────────────
  optional("blood_type", Text),
  optional("height", Integer),
  optional("weight", Integer),
  optional("eye_color", Text),
  optional("hair_color", Text),
  optional("shoe_size", Integer),
  optional("clothing_size", Text),
  optional("allergies", TextList),
  optional("chronic_diseases", TextList),
  optional("disability", Boolean),
  optional("military_service", Boolean),
  optional("driving_license", Boolean),
  optional("driving_categories", TextList),
  optional("has_car", Boolean),
  optional("car_brand", Text),
  optional("car_year", Integer),
  // ── Documents ───────────────────────────────────────────────────────────
  optional("passport_number", Text),
  optional("passport_issue_date", Date),
  optional("passport_issued_by", Text),
  optional("tax_id", Text),
  optional("social_security_number", Text),
  optional("medical_insurance_number", Text),
  optional("bank_details", Text),
  optional("credit_score", Integer),
  optional("criminal_record", Boolean),
  optional("political_views", Text),
  optional("religious_beliefs", Text),
  optional("organization_memberships", TextList),
  // ── Online presence ─────────────────────────────────────────────────────
  optional("social_media_links", TextList),
  optional("nickname", Text),
  optional("personal_website", Text),
  optional("blog_url", Text),
  optional("youtube_channel", Text),
  optional("spotify_playlist", Text),
  // ── Tastes & pursuits ───────────────────────────────────────────────────
  optional("favorite_music", TextList),
  optional("favorite_movies", TextList),
  optional("favorite_books", TextList),
  optional("favorite_foods", TextList),
  optional("dietary_preferences", Text),
  optional("sports_achievements", Text),
  optional("awards", TextList),
  optional("publications", TextList),
  optional("patents", TextList),
  optional("volunteer_activities", Text),
  optional("blood_donor", Boolean),
  optional("zodiac_sign", Text),
  optional("pets", TextList),
  optional("favorite_color", Text),
  optional("ring_size", Float),
  optional("tattoos", Boolean),
  optional("piercings", Boolean),
  optional("wears_glasses", Boolean),
  optional("disability_group", Text),
  optional("benefits", TextList),
  optional("pension_certificate", Text),
  optional("retirement_date", Date),
  optional("military_id", Text),
  optional("foreign_passport", Boolean),
  optional("visa", TextList),
  optional("visited_countries", TextList),
  optional("computer_skills", Text),
  optional("musical_instruments", TextList),
  optional("sports_clubs", TextList),
  optional("training_courses", TextList),
  optional("certificates", TextList),
  // ── Relations ───────────────────────────────────────────────────────────
  optional("parents", CitizenRefList),
  optional("spouse", CitizenRef),
  optional("children", CitizenRefList),
  optional("siblings", CitizenRefList),
  optional("grandparents", CitizenRefList),
  optional("colleagues", CitizenRefList),
  optional("classmates", CitizenRefList),
  optional("friends", CitizenRefList),
  optional("neighbors", CitizenRefList),
  optional("scientific_advisor", CitizenRef),
  optional("mentor", CitizenRef),
  optional("favorite_teacher", CitizenRef),
  // ── Records & samples ───────────────────────────────────────────────────
  optional("photo_albums", TextList),
  optional("documents", TextList),
  optional("medical_record", Text),
  optional("vaccinations", TextList),
  optional("health_group", Text),
  optional("last_fluorography_date", Date),
  optional("last_medical_exam_date", Date),
  optional("fingerprints", Text),
  optional("signature", Text),
  optional("handwriting_sample", Text),
  optional("voice_sample", Text),
  optional("video_presentation", Text),
  optional("qr_code", Text),
  optional("barcode", Text),
  // ── Personality ─────────────────────────────────────────────────────────
  optional("favorite_place", Text),
  optional("dream", Text),
  optional("life_credo", Text),
  optional("motto", Text),
  optional("superpower", Text),
  optional("fears", TextList),
  optional("phobias", TextList),
  optional("bad_habits", TextList),
  optional("sleep_schedule", Text),
  optional("preferred_vacation_type", Text),
  optional("favorite_holiday", Text),
  optional("hat_size", Float),
  optional("favorite_joke", Text),
  optional("favorite_quote", Text),
  optional("idol", Text),
  optional("motivation", Text),
  optional("yearly_goals", TextList),
  optional("achievements", TextList),
  optional("failures", TextList),
  optional("future_plans", Text),
  optional("family_tree", Text),
  optional("personal_coat_of_arms", Text),
  optional("favorite_superhero", Text),
  optional("favorite_game", Text),
  optional("favorite_sport", Text),
  optional("preferred_clothing_style", Text),
];
