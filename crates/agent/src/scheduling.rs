//! Consultation slot generation and ordinal selection
//!
//! Slots cover upcoming business days (weekends skipped) at fixed local
//! times, numbered 1-based for display. Generation is deterministic for
//! a given start date, which keeps tests and re-presentations stable
//! within a turn.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use intake_agent_config::SchedulingConfig;
use intake_agent_core::TimeSlot;

/// Generate up to `config.max_slots` slots starting the day after
/// `from`, skipping Saturdays and Sundays.
pub fn generate_slots(config: &SchedulingConfig, from: NaiveDate) -> Vec<TimeSlot> {
    // A day with no times can never fill the quota; without this guard
    // the loop below would never terminate.
    if config.slot_times.is_empty() || config.max_slots == 0 {
        return Vec::new();
    }

    let mut slots = Vec::with_capacity(config.max_slots);
    let mut day = from + Duration::days(1);

    while slots.len() < config.max_slots {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            for time in &config.slot_times {
                if slots.len() >= config.max_slots {
                    break;
                }
                slots.push(TimeSlot {
                    date: day.format("%Y-%m-%d").to_string(),
                    time: time.clone(),
                    display: format!("{} at {}", day.format("%A, %B %-d"), display_time(time)),
                });
            }
        }
        day += Duration::days(1);
    }

    slots
}

/// Generate slots starting from today (UTC date)
pub fn generate_slots_from_today(config: &SchedulingConfig) -> Vec<TimeSlot> {
    generate_slots(config, Utc::now().date_naive())
}

fn display_time(time: &str) -> String {
    match time.split_once(':') {
        Some((h, m)) => match h.parse::<u32>() {
            Ok(0) => format!("12:{m} AM"),
            Ok(hour) if hour < 12 => format!("{hour}:{m} AM"),
            Ok(12) => format!("12:{m} PM"),
            Ok(hour) => format!("{}:{m} PM", hour - 12),
            Err(_) => time.to_string(),
        },
        None => time.to_string(),
    }
}

/// Render the numbered slot list shown to the user
pub fn format_slot_list(slots: &[TimeSlot]) -> String {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| format!("{}. {}", i + 1, slot.display))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome of parsing a selection against an offered slot list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSelection {
    /// Valid ordinal; carries the chosen slot
    Chosen(TimeSlot),
    /// An integer was given but falls outside 1..=len
    OutOfRange { given: usize, max: usize },
    /// No integer found in the input
    NoSelection,
}

static ORDINAL_RE: Lazy<Regex> = Lazy::new(|| {
    // First integer anywhere covers "2", "slot 2", "#2", "option 2"
    Regex::new(r"(\d+)").unwrap_or_else(|e| panic!("ordinal regex: {e}"))
});

/// Parse the user's ordinal selection against the offered list
pub fn parse_slot_selection(input: &str, slots: &[TimeSlot]) -> SlotSelection {
    let Some(captures) = ORDINAL_RE.captures(input) else {
        return SlotSelection::NoSelection;
    };
    let Ok(n) = captures[1].parse::<usize>() else {
        return SlotSelection::NoSelection;
    };

    if n == 0 || n > slots.len() {
        return SlotSelection::OutOfRange {
            given: n,
            max: slots.len(),
        };
    }
    SlotSelection::Chosen(slots[n - 1].clone())
}

/// Error copy for an out-of-range pick, restating the valid range
pub fn out_of_range_message(given: usize, max: usize) -> String {
    format!(
        "Hmm, {given} isn't one of the options — please pick a number between 1 and {max}."
    )
}

/// Confirmation copy for a chosen slot
pub fn confirm_slot(slot: &TimeSlot) -> String {
    format!(
        "You're all set — your consultation is booked for {}. We'll follow up with the details shortly.",
        slot.display
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SchedulingConfig {
        SchedulingConfig::default()
    }

    // 2026-08-21 is a Friday
    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()
    }

    #[test]
    fn test_generates_fifteen_slots_skipping_weekend() {
        let slots = generate_slots(&config(), friday());
        assert_eq!(slots.len(), 15);
        // Next business day after Friday is Monday the 24th
        assert_eq!(slots[0].date, "2026-08-24");
        assert_eq!(slots[0].time, "10:00");
        // Three per day, five business days
        assert_eq!(slots[14].date, "2026-08-28");
        for slot in &slots {
            let date = NaiveDate::parse_from_str(&slot.date, "%Y-%m-%d").unwrap();
            assert!(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn test_no_slot_times_yields_no_slots() {
        let mut no_times = config();
        no_times.slot_times.clear();
        assert!(generate_slots(&no_times, friday()).is_empty());

        let mut no_quota = config();
        no_quota.max_slots = 0;
        assert!(generate_slots(&no_quota, friday()).is_empty());
    }

    #[test]
    fn test_selection_formats() {
        let slots = generate_slots(&config(), friday());
        let expected = SlotSelection::Chosen(slots[1].clone());
        assert_eq!(parse_slot_selection("2", &slots), expected);
        assert_eq!(parse_slot_selection("slot 2", &slots), expected);
        assert_eq!(parse_slot_selection("#2", &slots), expected);
        assert_eq!(parse_slot_selection("option 2 please", &slots), expected);
    }

    #[test]
    fn test_out_of_range_names_valid_range() {
        let slots = generate_slots(&config(), friday());
        match parse_slot_selection("99", &slots) {
            SlotSelection::OutOfRange { given, max } => {
                assert_eq!(given, 99);
                assert_eq!(max, 15);
                let msg = out_of_range_message(given, max);
                assert!(msg.contains("1 and 15"));
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_no_integer_is_no_selection() {
        let slots = generate_slots(&config(), friday());
        assert_eq!(parse_slot_selection("the afternoon one", &slots), SlotSelection::NoSelection);
    }

    #[test]
    fn test_round_trip_confirmation() {
        let slots = generate_slots(&config(), friday());
        if let SlotSelection::Chosen(slot) = parse_slot_selection("2", &slots) {
            assert_eq!(slot, slots[1]);
            assert!(confirm_slot(&slot).contains(&slot.display));
        } else {
            panic!("selection failed");
        }
    }

    #[test]
    fn test_display_time_conversion() {
        assert_eq!(display_time("10:00"), "10:00 AM");
        assert_eq!(display_time("13:00"), "1:00 PM");
        assert_eq!(display_time("15:00"), "3:00 PM");
    }
}
