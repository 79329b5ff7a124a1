use crate::models::{BookingSettings, Policy, PolicyScope, PolicyType};

/// Human-readable booking policies derived from the business settings.
///
/// With `PolicyScope::All` the order is deposit, cancellation, no-show,
/// rescheduling. The no-show line only appears for `All` and only when a
/// no-show fee is configured.
pub fn generate_booking_policy(settings: &BookingSettings, scope: PolicyScope) -> Vec<Policy> {
    let mut policies = Vec::new();

    if scope.includes(PolicyType::Deposit) {
        deposit_policy(settings, &mut policies);
    }
    if scope.includes(PolicyType::Cancellation) {
        cancellation_policy(settings, &mut policies);
    }
    if scope == PolicyScope::All && settings.no_show_fee_percent > 0 {
        push(
            &mut policies,
            PolicyType::NoShow,
            format!(
                "Missing your appointment without notice will incur a fee of {}% of the service price.",
                settings.no_show_fee_percent
            ),
        );
    }
    if scope.includes(PolicyType::Rescheduling) {
        rescheduling_policy(settings, &mut policies);
    }

    policies
}

fn push(policies: &mut Vec<Policy>, kind: PolicyType, text: String) {
    policies.push(Policy { kind, policy: text });
}

fn deposit_policy(settings: &BookingSettings, policies: &mut Vec<Policy>) {
    if settings.allow_deposits {
        push(
            policies,
            PolicyType::Deposit,
            format!(
                "A fixed deposit of {:.2} is required to confirm your booking.",
                settings.deposit_amount
            ),
        );
        push(
            policies,
            PolicyType::Deposit,
            "The deposit will be applied toward the total cost of your appointment.".to_string(),
        );
    } else {
        push(
            policies,
            PolicyType::Deposit,
            "Full payment is required at the time of booking; no deposit option is available."
                .to_string(),
        );
    }
}

fn cancellation_policy(settings: &BookingSettings, policies: &mut Vec<Policy>) {
    if !settings.cancellation_allowed {
        push(
            policies,
            PolicyType::Cancellation,
            "Cancellations are not permitted; the full service fee will be charged.".to_string(),
        );
    } else if settings.cancellation_notice_hours == 0 || settings.cancellation_fee_percent == 0 {
        push(
            policies,
            PolicyType::Cancellation,
            "You may cancel your booking at any time free of charge.".to_string(),
        );
    } else {
        push(
            policies,
            PolicyType::Cancellation,
            format!(
                "Cancellations must be made at least {} hours before your appointment.",
                settings.cancellation_notice_hours
            ),
        );
        push(
            policies,
            PolicyType::Cancellation,
            format!(
                "Cancellations made with less notice will incur a fee of {}% of the service price.",
                settings.cancellation_fee_percent
            ),
        );
    }
}

// Zero notice or fee is not special-cased here, unlike cancellation.
fn rescheduling_policy(settings: &BookingSettings, policies: &mut Vec<Policy>) {
    if !settings.reschedule_allowed {
        push(
            policies,
            PolicyType::Rescheduling,
            "Rescheduling is not permitted for this booking.".to_string(),
        );
    } else {
        push(
            policies,
            PolicyType::Rescheduling,
            format!(
                "Appointments may be rescheduled up to {} hours before the start time.",
                settings.reschedule_notice_hours
            ),
        );
        push(
            policies,
            PolicyType::Rescheduling,
            format!(
                "Rescheduling with less notice will incur a fee of {}% of the service price.",
                settings.reschedule_fee_percent
            ),
        );
    }
}
