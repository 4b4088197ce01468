//! User aggregate and its validation contract.
//!
//! Raw input arrives as a [`UserDraft`]. Validation turns it into
//! [`UserDetails`] or a [`UserValidationErrors`] list naming every offending
//! field, so an invalid user can never reach a repository. A [`User`] is
//! built from validated details plus server-assigned identity and timestamps.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

/// Maximum length, in characters, of a first or last name.
pub const NAME_MAX: usize = 64;
/// Maximum length, in characters, of an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum length, in characters, of free-form text fields.
pub const TEXT_MAX: usize = 128;
/// Smallest accepted user or address type code.
pub const TYPE_CODE_MIN: i64 = 1;
/// Largest accepted user or address type code.
pub const TYPE_CODE_MAX: i64 = 255;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static ZIPCODE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn zipcode_regex() -> &'static Regex {
    ZIPCODE_RE.get_or_init(|| {
        // Length is part of the pattern: 3 to 10 characters overall.
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]{1,8}[A-Za-z0-9]$")
            .unwrap_or_else(|error| panic!("zipcode regex failed to compile: {error}"))
    })
}

/// Errors returned when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    Invalid,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use apid::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(UserId::new("42").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserIdError::Empty);
        }
        if id.trim() != id {
            return Err(UserIdError::Invalid);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserIdError::Invalid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Category of a single field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// A required field was absent or blank.
    MissingField,
    /// The value exceeded the allowed number of characters.
    TooLong { max: usize },
    /// The value did not have the expected shape.
    InvalidFormat,
    /// A numeric value fell outside the accepted range.
    OutOfRange { min: i64, max: i64 },
}

impl FieldErrorKind {
    /// Stable machine-readable code for the failure.
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::TooLong { .. } => "too_long",
            Self::InvalidFormat => "invalid_format",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// A validation failure tied to a JSON-style field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFieldError {
    field: String,
    kind: FieldErrorKind,
}

impl UserFieldError {
    fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Path of the offending field, for example `addresses[0].city`.
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Failure category.
    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    /// Human-readable explanation.
    pub fn message(&self) -> String {
        let field = self.field.as_str();
        match self.kind {
            FieldErrorKind::MissingField => format!("{field} is required"),
            FieldErrorKind::TooLong { max } => {
                format!("{field} must be at most {max} characters")
            }
            FieldErrorKind::InvalidFormat => format!("{field} has an invalid format"),
            FieldErrorKind::OutOfRange { min, max } => {
                format!("{field} must be between {min} and {max}")
            }
        }
    }
}

impl fmt::Display for UserFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Every field failure found in a [`UserDraft`].
///
/// ## Invariants
/// - Contains at least one [`UserFieldError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserValidationErrors(Vec<UserFieldError>);

impl UserValidationErrors {
    /// Iterate over the individual failures in input order.
    pub fn iter(&self) -> impl Iterator<Item = &UserFieldError> {
        self.0.iter()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` is among the failures.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field() == field)
    }
}

impl fmt::Display for UserValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UserValidationErrors {}

/// Numeric type code classifying a user or an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeCode(u8);

impl TypeCode {
    /// Validate a raw type code.
    pub fn new(raw: i64) -> Result<Self, FieldErrorKind> {
        if !(TYPE_CODE_MIN..=TYPE_CODE_MAX).contains(&raw) {
            return Err(FieldErrorKind::OutOfRange {
                min: TYPE_CODE_MIN,
                max: TYPE_CODE_MAX,
            });
        }
        u8::try_from(raw).map(Self).map_err(|_| FieldErrorKind::OutOfRange {
            min: TYPE_CODE_MIN,
            max: TYPE_CODE_MAX,
        })
    }

    /// Raw numeric value.
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Non-blank personal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Syntactically plausible email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Unvalidated address input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    pub address_type: Option<i64>,
    pub line_one: Option<String>,
    pub line_two: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub phone: Option<String>,
}

/// Unvalidated user input, as decoded from a request or a stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub user_type: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub addresses: Vec<AddressDraft>,
}

/// Validated postal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetails {
    address_type: TypeCode,
    line_one: Option<String>,
    line_two: Option<String>,
    city: String,
    state: String,
    zipcode: String,
    phone: Option<String>,
}

impl AddressDetails {
    /// Address type code.
    pub fn address_type(&self) -> TypeCode {
        self.address_type
    }

    /// First street line.
    pub fn line_one(&self) -> Option<&str> {
        self.line_one.as_deref()
    }

    /// Second street line.
    pub fn line_two(&self) -> Option<&str> {
        self.line_two.as_deref()
    }

    /// City name.
    pub fn city(&self) -> &str {
        self.city.as_str()
    }

    /// State or region.
    pub fn state(&self) -> &str {
        self.state.as_str()
    }

    /// Postal code.
    pub fn zipcode(&self) -> &str {
        self.zipcode.as_str()
    }

    /// Contact phone number.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// Validated mutable user fields.
///
/// ## Invariants
/// - Names are non-blank and at most [`NAME_MAX`] characters.
/// - `email` matches `local@domain.tld`.
/// - At least one address is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    user_type: TypeCode,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    company: Option<String>,
    addresses: Vec<AddressDetails>,
}

impl UserDetails {
    /// Validate a draft, collecting every failing field.
    ///
    /// # Examples
    /// ```
    /// use apid::domain::{AddressDraft, UserDetails, UserDraft};
    ///
    /// let draft = UserDraft {
    ///     user_type: Some(1),
    ///     first_name: Some("Bill".into()),
    ///     last_name: Some("Kennedy".into()),
    ///     email: Some("bill@example.com".into()),
    ///     addresses: vec![AddressDraft {
    ///         address_type: Some(1),
    ///         city: Some("Miami".into()),
    ///         state: Some("FL".into()),
    ///         zipcode: Some("33172".into()),
    ///         ..AddressDraft::default()
    ///     }],
    ///     ..UserDraft::default()
    /// };
    /// let details = UserDetails::try_from_draft(draft).expect("valid draft");
    /// assert_eq!(details.first_name().as_ref(), "Bill");
    ///
    /// let errors = UserDetails::try_from_draft(UserDraft::default()).expect_err("empty draft");
    /// assert!(errors.contains_field("email"));
    /// ```
    pub fn try_from_draft(draft: UserDraft) -> Result<Self, UserValidationErrors> {
        let mut validator = FieldValidator::default();

        let user_type = validator.type_code("type", draft.user_type);
        let first_name = validator.required_text("firstName", draft.first_name, NAME_MAX);
        let last_name = validator.required_text("lastName", draft.last_name, NAME_MAX);
        let email = validator.matching("email", draft.email, EMAIL_MAX, email_regex());
        let company = validator.optional_text("company", draft.company, TEXT_MAX);

        if draft.addresses.is_empty() {
            validator.push("addresses", FieldErrorKind::MissingField);
        }
        let addresses: Vec<Option<AddressDetails>> = draft
            .addresses
            .into_iter()
            .enumerate()
            .map(|(index, address)| validator.address(index, address))
            .collect();

        if !validator.errors.is_empty() {
            return Err(UserValidationErrors(validator.errors));
        }

        match (
            user_type,
            first_name,
            last_name,
            email,
            company,
            addresses.into_iter().collect::<Option<Vec<_>>>(),
        ) {
            (
                Some(user_type),
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(company),
                Some(addresses),
            ) => Ok(Self {
                user_type,
                first_name: PersonName(first_name),
                last_name: PersonName(last_name),
                email: EmailAddress(email),
                company,
                addresses,
            }),
            // Every `None` above records a field error, so this arm is only
            // reachable if the validator and this match drift apart.
            _ => Err(UserValidationErrors(vec![UserFieldError::new(
                "user",
                FieldErrorKind::InvalidFormat,
            )])),
        }
    }

    /// User type code.
    pub fn user_type(&self) -> TypeCode {
        self.user_type
    }

    /// Given name.
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Contact email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Employer, if any.
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Postal addresses in submission order.
    pub fn addresses(&self) -> &[AddressDetails] {
        &self.addresses
    }
}

impl TryFrom<UserDraft> for UserDetails {
    type Error = UserValidationErrors;

    fn try_from(value: UserDraft) -> Result<Self, Self::Error> {
        Self::try_from_draft(value)
    }
}

#[derive(Default)]
struct FieldValidator {
    errors: Vec<UserFieldError>,
}

impl FieldValidator {
    fn push(&mut self, field: impl Into<String>, kind: FieldErrorKind) {
        self.errors.push(UserFieldError::new(field, kind));
    }

    fn required_text(
        &mut self,
        field: impl Into<String>,
        value: Option<String>,
        max: usize,
    ) -> Option<String> {
        let Some(text) = normalise(value) else {
            self.push(field, FieldErrorKind::MissingField);
            return None;
        };
        if text.chars().count() > max {
            self.push(field, FieldErrorKind::TooLong { max });
            return None;
        }
        Some(text)
    }

    fn optional_text(
        &mut self,
        field: impl Into<String>,
        value: Option<String>,
        max: usize,
    ) -> Option<Option<String>> {
        match normalise(value) {
            Some(text) if text.chars().count() > max => {
                self.push(field, FieldErrorKind::TooLong { max });
                None
            }
            other => Some(other),
        }
    }

    fn matching(
        &mut self,
        field: impl Into<String>,
        value: Option<String>,
        max: usize,
        pattern: &Regex,
    ) -> Option<String> {
        let field = field.into();
        let text = self.required_text(field.clone(), value, max)?;
        if pattern.is_match(&text) {
            Some(text)
        } else {
            self.push(field, FieldErrorKind::InvalidFormat);
            None
        }
    }

    fn type_code(&mut self, field: impl Into<String>, value: Option<i64>) -> Option<TypeCode> {
        let Some(raw) = value else {
            self.push(field, FieldErrorKind::MissingField);
            return None;
        };
        match TypeCode::new(raw) {
            Ok(code) => Some(code),
            Err(kind) => {
                self.push(field, kind);
                None
            }
        }
    }

    fn address(&mut self, index: usize, draft: AddressDraft) -> Option<AddressDetails> {
        let path = |name: &str| format!("addresses[{index}].{name}");

        let address_type = self.type_code(path("type"), draft.address_type);
        let line_one = self.optional_text(path("lineOne"), draft.line_one, TEXT_MAX);
        let line_two = self.optional_text(path("lineTwo"), draft.line_two, TEXT_MAX);
        let city = self.required_text(path("city"), draft.city, TEXT_MAX);
        let state = self.required_text(path("state"), draft.state, TEXT_MAX);
        let zipcode = self.matching(path("zipcode"), draft.zipcode, TEXT_MAX, zipcode_regex());
        let phone = self.optional_text(path("phone"), draft.phone, TEXT_MAX);

        Some(AddressDetails {
            address_type: address_type?,
            line_one: line_one?,
            line_two: line_two?,
            city: city?,
            state: state?,
            zipcode: zipcode?,
            phone: phone?,
        })
    }
}

fn normalise(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Creation and modification instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps for a record created at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created: now,
            modified: now,
        }
    }
}

/// Address owned by a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    details: AddressDetails,
    timestamps: Timestamps,
}

impl Address {
    /// Validated address fields.
    pub fn details(&self) -> &AddressDetails {
        &self.details
    }

    /// Creation and modification instants.
    pub fn timestamps(&self) -> Timestamps {
        self.timestamps
    }
}

/// Application user.
///
/// ## Invariants
/// - Built only from validated [`UserDetails`].
/// - `id` and `timestamps.created` never change after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    user_type: TypeCode,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    company: Option<String>,
    addresses: Vec<Address>,
    timestamps: Timestamps,
}

impl User {
    /// Build a newly registered user; the user and its addresses share `now`.
    pub fn register(id: UserId, details: UserDetails, now: DateTime<Utc>) -> Self {
        let stamps = vec![Timestamps::at(now); details.addresses.len()];
        Self::assemble(id, details, stamps, Timestamps::at(now))
    }

    /// Rebuild a user from persisted parts.
    ///
    /// Address timestamps are matched by position; missing entries fall back
    /// to the user's own timestamps.
    pub fn restore(
        id: UserId,
        details: UserDetails,
        address_timestamps: Vec<Timestamps>,
        timestamps: Timestamps,
    ) -> Self {
        let mut stamps = address_timestamps;
        stamps.resize(details.addresses.len(), timestamps);
        Self::assemble(id, details, stamps, timestamps)
    }

    /// Replace the mutable fields, keeping identity and creation time.
    ///
    /// The address at index `i` keeps the creation time of the previous
    /// address at the same index.
    pub fn revise(&self, details: UserDetails, now: DateTime<Utc>) -> Self {
        let stamps = (0..details.addresses.len())
            .map(|index| Timestamps {
                created: self
                    .addresses
                    .get(index)
                    .map_or(now, |address| address.timestamps.created),
                modified: now,
            })
            .collect();
        Self::assemble(
            self.id,
            details,
            stamps,
            Timestamps {
                created: self.timestamps.created,
                modified: now,
            },
        )
    }

    fn assemble(
        id: UserId,
        details: UserDetails,
        address_timestamps: Vec<Timestamps>,
        timestamps: Timestamps,
    ) -> Self {
        let UserDetails {
            user_type,
            first_name,
            last_name,
            email,
            company,
            addresses,
        } = details;
        let addresses = addresses
            .into_iter()
            .zip(address_timestamps)
            .map(|(details, timestamps)| Address {
                details,
                timestamps,
            })
            .collect();
        Self {
            id,
            user_type,
            first_name,
            last_name,
            email,
            company,
            addresses,
            timestamps,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// User type code.
    pub fn user_type(&self) -> TypeCode {
        self.user_type
    }

    /// Given name.
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Contact email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Employer, if any.
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Owned addresses.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Creation and modification instants.
    pub fn timestamps(&self) -> Timestamps {
        self.timestamps
    }

    /// The mutable fields, without server-assigned values.
    pub fn details(&self) -> UserDetails {
        UserDetails {
            user_type: self.user_type,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
            addresses: self
                .addresses
                .iter()
                .map(|address| address.details.clone())
                .collect(),
        }
    }
}
