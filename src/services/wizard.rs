use chrono::NaiveDateTime;

use crate::models::{MediaType, ScreenLocation, ScreenPricingOption};
use crate::services::pricing::{self, PricingError, Quote};

/// Steps of the booking flow, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Location,
    Pricing,
    Schedule,
    Content,
    Review,
    Confirmation,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Location => "location",
            WizardStep::Pricing => "pricing",
            WizardStep::Schedule => "schedule",
            WizardStep::Content => "content",
            WizardStep::Review => "review",
            WizardStep::Confirmation => "confirmation",
        }
    }

    fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Location => None,
            WizardStep::Pricing => Some(WizardStep::Location),
            WizardStep::Schedule => Some(WizardStep::Pricing),
            WizardStep::Content => Some(WizardStep::Schedule),
            WizardStep::Review => Some(WizardStep::Content),
            // Terminal: leaving a confirmed booking flow is navigation, not "previous".
            WizardStep::Confirmation => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum WizardError {
    WrongStep {
        expected: WizardStep,
        at: WizardStep,
    },
    CannotGoBack(WizardStep),
    InactiveLocation,
    OptionNotForLocation,
    InvalidSchedule(PricingError),
    Incomplete { missing: &'static str },
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::WrongStep { expected, at } => {
                write!(
                    f,
                    "step {} is not available from step {}",
                    expected.as_str(),
                    at.as_str()
                )
            }
            WizardError::CannotGoBack(step) => {
                write!(f, "cannot go back from step {}", step.as_str())
            }
            WizardError::InactiveLocation => write!(f, "screen location is not active"),
            WizardError::OptionNotForLocation => {
                write!(f, "pricing option does not belong to the selected location")
            }
            WizardError::InvalidSchedule(e) => write!(f, "{e}"),
            WizardError::Incomplete { missing } => {
                write!(f, "wizard draft is missing {missing}")
            }
        }
    }
}

/// Everything entered so far. Kept across backward navigation so stepping
/// back does not lose input.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub location: Option<ScreenLocation>,
    pub pricing_option: Option<ScreenPricingOption>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub quote: Option<Quote>,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub request_notes_en: Option<String>,
    pub request_notes_ar: Option<String>,
}

/// The submission payload produced at the review step.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub location_id: String,
    pub pricing_option_id: String,
    pub merchant_id: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub duration_hours: i64,
    pub total_price_minor: i64,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub request_notes_en: Option<String>,
    pub request_notes_ar: Option<String>,
}

/// Linear booking wizard. Each forward transition validates its own step and
/// moves exactly one step ahead; illegal jumps are errors rather than no-ops.
pub struct BookingWizard {
    step: WizardStep,
    merchant_id: String,
    draft: BookingDraft,
}

impl BookingWizard {
    pub fn new(merchant_id: impl Into<String>) -> Self {
        Self {
            step: WizardStep::Location,
            merchant_id: merchant_id.into(),
            draft: BookingDraft::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    fn expect(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                at: self.step,
            })
        }
    }

    /// Location step: pick an active screen site.
    pub fn select_location(&mut self, location: ScreenLocation) -> Result<(), WizardError> {
        self.expect(WizardStep::Location)?;
        if !location.active {
            return Err(WizardError::InactiveLocation);
        }
        self.draft.location = Some(location);
        self.step = WizardStep::Pricing;
        Ok(())
    }

    /// Pricing step: pick a rate card entry scoped to the chosen location.
    /// Pre-fills the schedule with one billing unit from the given start.
    pub fn select_pricing(
        &mut self,
        option: ScreenPricingOption,
        start_at: NaiveDateTime,
    ) -> Result<(), WizardError> {
        self.expect(WizardStep::Pricing)?;
        let location = self
            .draft
            .location
            .as_ref()
            .ok_or(WizardError::Incomplete { missing: "location" })?;
        if option.location_id != location.id {
            return Err(WizardError::OptionNotForLocation);
        }

        let end_at = pricing::default_end(&start_at, option.pricing_type);
        let quote =
            pricing::quote(&option, &start_at, &end_at).map_err(WizardError::InvalidSchedule)?;

        self.draft.pricing_option = Some(option);
        self.draft.start_at = Some(start_at);
        self.draft.end_at = Some(end_at);
        self.draft.quote = Some(quote);
        self.step = WizardStep::Schedule;
        Ok(())
    }

    /// Schedule step: override the window. End must be after start; the
    /// quote is recomputed from the final window.
    pub fn set_schedule(
        &mut self,
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
    ) -> Result<Quote, WizardError> {
        self.expect(WizardStep::Schedule)?;
        let option = self
            .draft
            .pricing_option
            .as_ref()
            .ok_or(WizardError::Incomplete {
                missing: "pricing option",
            })?;

        let quote =
            pricing::quote(option, &start_at, &end_at).map_err(WizardError::InvalidSchedule)?;

        self.draft.start_at = Some(start_at);
        self.draft.end_at = Some(end_at);
        self.draft.quote = Some(quote);
        self.step = WizardStep::Content;
        Ok(quote)
    }

    /// Content step: optional media and optional bilingual notes. Nothing is
    /// required here; notes-only and empty-content bookings are allowed.
    pub fn set_content(
        &mut self,
        media: Option<(String, MediaType)>,
        request_notes_en: Option<String>,
        request_notes_ar: Option<String>,
    ) -> Result<(), WizardError> {
        self.expect(WizardStep::Content)?;
        if let Some((url, media_type)) = media {
            self.draft.media_url = Some(url);
            self.draft.media_type = Some(media_type);
        }
        self.draft.request_notes_en = request_notes_en;
        self.draft.request_notes_ar = request_notes_ar;
        self.step = WizardStep::Review;
        Ok(())
    }

    /// Review step: the full submission payload. Leaves the wizard at
    /// Review so a failed submission can be retried.
    pub fn build_request(&self) -> Result<BookingRequest, WizardError> {
        self.expect(WizardStep::Review)?;
        let draft = &self.draft;
        let location = draft
            .location
            .as_ref()
            .ok_or(WizardError::Incomplete { missing: "location" })?;
        let option = draft.pricing_option.as_ref().ok_or(WizardError::Incomplete {
            missing: "pricing option",
        })?;
        let quote = draft
            .quote
            .ok_or(WizardError::Incomplete { missing: "quote" })?;

        Ok(BookingRequest {
            location_id: location.id.clone(),
            pricing_option_id: option.id.clone(),
            merchant_id: self.merchant_id.clone(),
            start_at: draft
                .start_at
                .ok_or(WizardError::Incomplete { missing: "start" })?,
            end_at: draft
                .end_at
                .ok_or(WizardError::Incomplete { missing: "end" })?,
            duration_hours: quote.duration_hours,
            total_price_minor: quote.total_minor,
            media_url: draft.media_url.clone(),
            media_type: draft.media_type,
            request_notes_en: draft.request_notes_en.clone(),
            request_notes_ar: draft.request_notes_ar.clone(),
        })
    }

    /// Marks the submission as accepted by the server. Terminal.
    pub fn confirm(&mut self) -> Result<(), WizardError> {
        self.expect(WizardStep::Review)?;
        self.step = WizardStep::Confirmation;
        Ok(())
    }

    /// Steps back exactly one step. Entered data is preserved.
    pub fn back(&mut self) -> Result<(), WizardError> {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                Ok(())
            }
            None => Err(WizardError::CannotGoBack(self.step)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingType;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn location(id: &str, active: bool) -> ScreenLocation {
        ScreenLocation {
            id: id.to_string(),
            name_en: "Mall Entrance".to_string(),
            name_ar: "مدخل المول".to_string(),
            address_en: "King Fahd Rd".to_string(),
            address_ar: "طريق الملك فهد".to_string(),
            city_en: "Riyadh".to_string(),
            city_ar: "الرياض".to_string(),
            active,
        }
    }

    fn option(id: &str, location_id: &str, pricing_type: PricingType) -> ScreenPricingOption {
        ScreenPricingOption {
            id: id.to_string(),
            location_id: location_id.to_string(),
            pricing_type,
            price_per_unit_minor: 200,
        }
    }

    fn wizard_at_schedule() -> BookingWizard {
        let mut wizard = BookingWizard::new("merchant-1");
        wizard.select_location(location("loc-1", true)).unwrap();
        wizard
            .select_pricing(option("opt-1", "loc-1", PricingType::Daily), dt("2025-01-01 00:00"))
            .unwrap();
        wizard
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut wizard = wizard_at_schedule();
        assert_eq!(wizard.step(), WizardStep::Schedule);

        let quote = wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-02 00:00"))
            .unwrap();
        assert_eq!(quote.units, 1);
        assert_eq!(quote.total_minor, 200);
        assert_eq!(wizard.step(), WizardStep::Content);

        wizard.set_content(None, Some("launch ad".to_string()), None).unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);

        let request = wizard.build_request().unwrap();
        assert_eq!(request.merchant_id, "merchant-1");
        assert_eq!(request.total_price_minor, 200);
        assert_eq!(request.duration_hours, 24);

        wizard.confirm().unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirmation);
    }

    #[test]
    fn test_skipping_a_step_is_an_error() {
        let mut wizard = BookingWizard::new("merchant-1");
        let err = wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-02 00:00"))
            .unwrap_err();
        assert_eq!(
            err,
            WizardError::WrongStep {
                expected: WizardStep::Schedule,
                at: WizardStep::Location,
            }
        );
    }

    #[test]
    fn test_inactive_location_rejected() {
        let mut wizard = BookingWizard::new("merchant-1");
        let err = wizard.select_location(location("loc-1", false)).unwrap_err();
        assert_eq!(err, WizardError::InactiveLocation);
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[test]
    fn test_option_must_belong_to_location() {
        let mut wizard = BookingWizard::new("merchant-1");
        wizard.select_location(location("loc-1", true)).unwrap();
        let err = wizard
            .select_pricing(option("opt-9", "loc-2", PricingType::Hourly), dt("2025-01-01 10:00"))
            .unwrap_err();
        assert_eq!(err, WizardError::OptionNotForLocation);
        assert_eq!(wizard.step(), WizardStep::Pricing);
    }

    #[test]
    fn test_pricing_selection_prefills_one_unit() {
        let wizard = wizard_at_schedule();
        let draft = wizard.draft();
        assert_eq!(draft.start_at, Some(dt("2025-01-01 00:00")));
        assert_eq!(draft.end_at, Some(dt("2025-01-02 00:00")));
        assert_eq!(draft.quote.unwrap().units, 1);
    }

    #[test]
    fn test_end_before_start_rejected_at_schedule() {
        let mut wizard = wizard_at_schedule();
        let err = wizard
            .set_schedule(dt("2025-01-02 00:00"), dt("2025-01-01 00:00"))
            .unwrap_err();
        assert_eq!(
            err,
            WizardError::InvalidSchedule(PricingError::EndNotAfterStart)
        );
        assert_eq!(wizard.step(), WizardStep::Schedule);
    }

    #[test]
    fn test_back_steps_exactly_one_and_keeps_data() {
        let mut wizard = wizard_at_schedule();
        wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-03 00:00"))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Content);

        wizard.back().unwrap();
        assert_eq!(wizard.step(), WizardStep::Schedule);
        wizard.back().unwrap();
        assert_eq!(wizard.step(), WizardStep::Pricing);

        // Earlier input survives backward navigation
        assert!(wizard.draft().location.is_some());
        assert_eq!(wizard.draft().start_at, Some(dt("2025-01-01 00:00")));
        assert_eq!(wizard.draft().end_at, Some(dt("2025-01-03 00:00")));
    }

    #[test]
    fn test_back_from_first_step_is_an_error() {
        let mut wizard = BookingWizard::new("merchant-1");
        assert_eq!(
            wizard.back().unwrap_err(),
            WizardError::CannotGoBack(WizardStep::Location)
        );
    }

    #[test]
    fn test_back_from_confirmation_is_an_error() {
        let mut wizard = wizard_at_schedule();
        wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-02 00:00"))
            .unwrap();
        wizard.set_content(None, None, None).unwrap();
        wizard.confirm().unwrap();
        assert_eq!(
            wizard.back().unwrap_err(),
            WizardError::CannotGoBack(WizardStep::Confirmation)
        );
    }

    #[test]
    fn test_failed_submission_keeps_wizard_at_review() {
        let mut wizard = wizard_at_schedule();
        wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-02 00:00"))
            .unwrap();
        wizard.set_content(None, None, None).unwrap();

        // build_request does not advance; a failed submit can retry
        let first = wizard.build_request().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        let second = wizard.build_request().unwrap();
        assert_eq!(first.total_price_minor, second.total_price_minor);
    }

    #[test]
    fn test_content_step_accepts_media() {
        let mut wizard = wizard_at_schedule();
        wizard
            .set_schedule(dt("2025-01-01 00:00"), dt("2025-01-02 00:00"))
            .unwrap();
        wizard
            .set_content(
                Some(("/media/ad.png".to_string(), MediaType::Image)),
                None,
                Some("إعلان".to_string()),
            )
            .unwrap();

        let request = wizard.build_request().unwrap();
        assert_eq!(request.media_url.as_deref(), Some("/media/ad.png"));
        assert_eq!(request.media_type, Some(MediaType::Image));
        assert_eq!(request.request_notes_ar.as_deref(), Some("إعلان"));
    }
}
