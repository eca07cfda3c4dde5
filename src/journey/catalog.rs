//! The fixed guest lifecycle, in chronological order.

use serde::Serialize;

use super::StageIcon;

/// One step of the guest lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub title: &'static str,
    pub emoji: &'static str,
    pub actions: &'static [&'static str],
    pub message: &'static str,
    #[serde(skip)]
    pub icon: StageIcon,
}

pub const STAGE_COUNT: usize = 6;
pub const LAST_STAGE: usize = STAGE_COUNT - 1;

pub static STAGES: [Stage; STAGE_COUNT] = [
    Stage {
        title: "Guest has booked",
        emoji: "🎉",
        actions: &["Welcome message", "FAQ's"],
        message: "Hey John! Thanks for booking with us. Your confirmation email is on its way. \
                  Want to make the most of your stay? We're here to help with activity planning, \
                  local tips, and anything else you need.",
        icon: StageIcon::Chat,
    },
    Stage {
        title: "Pre-arrival",
        emoji: "✈️",
        actions: &[
            "Early online check in",
            "Guest inquiries",
            "Hotel amenities",
            "Upselling",
            "Things to do",
        ],
        message: "Hi John! We look forward to welcoming you to the Lex Hotel. Feel free to text us \
                  here if there is anything we can do before, during or after your stay. As a \
                  friendly reminder, check-in time is 3pm. If you plan to arrive on the later side, \
                  please let us know so we can prepare as well as possible for you.\n\n\
                  Warm regards,\nGuest Experience Team",
        icon: StageIcon::Hotel,
    },
    Stage {
        title: "Arrival",
        emoji: "🔑",
        actions: &["Hotel Amenities", "Digital Keys"],
        message: "Hi John! Welcome to Lex Hotel. Our wifi password is 'LexGuest2024'\n\n\
                  We're excited to have you with us and look forward to doing whatever we can to \
                  help make this a very special visit.\n\n\
                  Warm regards,\nGuest Experience Team",
        icon: StageIcon::Key,
    },
    Stage {
        title: "In-stay",
        emoji: "🌟",
        actions: &[
            "Issue handling",
            "Restaurant Reservation",
            "Spa Booking",
            "Staff forwarding",
            "Issue Handling",
            "Room Service",
        ],
        message: "It's a pleasure having you here at Lex Hotel. We just wanted to follow up and \
                  ensure everything you need is in the suite and to your expectation. If anything \
                  is missing or have some concerns, please do not hesitate to let us know.",
        icon: StageIcon::Home,
    },
    Stage {
        title: "Departure",
        emoji: "👋",
        actions: &["Online checkout", "Late checkout"],
        message: "Dear John, we hope you enjoyed your stay with us. Your checkout time is 11 AM. \
                  Would you like to request a late checkout or assistance with your luggage?",
        icon: StageIcon::Checklist,
    },
    Stage {
        title: "Post-departure",
        emoji: "💝",
        actions: &[
            "Feedback Gathering",
            "Online Review Requests",
            "Loyalty signups",
            "Discount offers",
        ],
        message: "It was a pleasure having you with us here at Lex Hotel. We take enormous pride \
                  in what we do and thrive on guest feedback. Please click below to share your \
                  quick thoughts: [Review Link]\n\n\
                  Thank you so much,\nRobert, General Manager",
        icon: StageIcon::Heart,
    },
];

/// Stage at `index`, clamped to the last stage
pub fn stage(index: usize) -> &'static Stage {
    &STAGES[index.min(LAST_STAGE)]
}
