use slot_notify_core::{CallbackEvent, Controller, Outcome, Screen, SelectionStore};
use slot_notify_transport_telegram::bot::views::{prompt_keyboard, render_broadcast_html};
use teloxide::types::InlineKeyboardButtonKind;

fn callback_payloads(screen: Screen) -> Vec<String> {
    prompt_keyboard(&screen.into())
        .inline_keyboard
        .into_iter()
        .flatten()
        .filter_map(|button| match button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn every_rendered_button_is_accepted_by_the_controller() {
    let controller = Controller::new(SelectionStore::new());

    for payload in callback_payloads(Screen::StatusSelection) {
        let outcome = controller
            .transition(1, CallbackEvent::parse(&payload))
            .await;
        assert!(
            matches!(outcome, Outcome::Advanced(_)),
            "status button {payload} was rejected"
        );
    }

    for payload in callback_payloads(Screen::CitySelection) {
        let outcome = controller
            .transition(1, CallbackEvent::parse(&payload))
            .await;
        let Outcome::Completed(completion) = outcome else {
            panic!("city button {payload} was rejected");
        };
        let html = render_broadcast_html(&completion.broadcast);
        assert!(lazy_regex::regex_is_match!(
            r"^(✅|❌) <b>Slot (Not )?Available</b> in [A-Za-z ]+ at \d{2}:\d{2}:\d{2} (AM|PM)$",
            &html
        ));
    }
}

#[test]
fn callback_data_fits_telegram_limit() {
    for screen in [Screen::StatusSelection, Screen::CitySelection] {
        for payload in callback_payloads(screen) {
            assert!(payload.len() <= 64, "{payload} exceeds 64 bytes");
        }
    }
}
