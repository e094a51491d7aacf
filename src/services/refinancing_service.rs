use chrono::{Datelike, Utc};

use crate::errors::AppError;
use crate::external::RateProvider;
use crate::models::{LoanDetails, MarketRates, RefinancingOpportunity};
use crate::utils::{round_money, round_to};

/// Closing costs as a share of the loan amount.
pub const CLOSING_COST_RATE: f64 = 0.03;
/// Fixed appraisal, title and miscellaneous fees.
pub const CLOSING_COST_FIXED: f64 = 2_300.0;
/// Annual discount rate applied to future savings in the NPV.
pub const DISCOUNT_RATE: f64 = 0.05;
/// Conforming loan limit; larger loans price at the jumbo rate.
pub const JUMBO_THRESHOLD: f64 = 766_550.0;

/// Standard amortizing payment. Degenerates to straight division at 0%.
pub fn calculate_monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }
    let monthly_rate = annual_rate / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return round_money(principal / term_months as f64);
    }
    let factor = (1.0 + monthly_rate).powi(term_months as i32);
    round_money(principal * monthly_rate * factor / (factor - 1.0))
}

/// Balance outstanding after `months_paid` scheduled payments.
pub fn calculate_remaining_balance(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    months_paid: u32,
) -> f64 {
    if months_paid >= term_months {
        return 0.0;
    }
    let monthly_rate = annual_rate / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return round_money(principal * (1.0 - months_paid as f64 / term_months as f64));
    }
    let full = (1.0 + monthly_rate).powi(term_months as i32);
    let paid = (1.0 + monthly_rate).powi(months_paid as i32);
    round_money(principal * (full - paid) / (full - 1.0))
}

pub fn estimate_closing_costs(loan_amount: f64) -> f64 {
    round_money(loan_amount * CLOSING_COST_RATE + CLOSING_COST_FIXED)
}

/// NPV of the monthly savings stream against the upfront closing costs,
/// discounted monthly.
pub fn calculate_npv(
    monthly_savings: f64,
    closing_costs: f64,
    term_months: u32,
    annual_discount_rate: Option<f64>,
) -> f64 {
    let monthly_discount = annual_discount_rate.unwrap_or(DISCOUNT_RATE) / 12.0;
    let present_value = if monthly_discount == 0.0 {
        monthly_savings * term_months as f64
    } else {
        monthly_savings * (1.0 - (1.0 + monthly_discount).powi(-(term_months as i32)))
            / monthly_discount
    };
    round_money(present_value - closing_costs)
}

/// Compare the existing loan against a market rate and decide whether a
/// refinance is worthwhile. Decision rules are evaluated strictly in order;
/// the first match wins.
pub fn analyze_refinancing(
    current_loan: &LoanDetails,
    market_rate: f64,
    assumed_term_months: Option<u32>,
    property_value: Option<f64>,
) -> Result<RefinancingOpportunity, AppError> {
    if current_loan.principal_balance <= 0.0 {
        return Err(AppError::Validation(
            "loan principal must be positive".to_string(),
        ));
    }
    if current_loan.term_length_months == 0 {
        return Err(AppError::Validation(
            "loan term must be positive".to_string(),
        ));
    }

    let remaining_months = derive_remaining_months(current_loan);
    let new_term_months = assumed_term_months.unwrap_or(remaining_months);

    let current_payment = current_loan.monthly_payment;
    let new_payment = calculate_monthly_payment(
        current_loan.principal_balance,
        market_rate,
        new_term_months,
    );
    let monthly_savings = round_money(current_payment - new_payment);

    let closing_costs = round_money(
        estimate_closing_costs(current_loan.principal_balance)
            + current_loan.prepayment_penalty.unwrap_or(0.0),
    );

    let break_even_months = if monthly_savings > 0.0 {
        Some((closing_costs / monthly_savings).ceil() as u32)
    } else {
        None
    };

    let total_interest_current = round_money(
        current_payment * remaining_months as f64 - current_loan.principal_balance,
    );
    let total_interest_new =
        round_money(new_payment * new_term_months as f64 - current_loan.principal_balance);
    let total_interest_savings = round_money(total_interest_current - total_interest_new);
    let lifetime_savings = round_money(total_interest_savings - closing_costs);

    let npv = calculate_npv(monthly_savings, closing_costs, new_term_months, None);

    let value = property_value.or(current_loan.property_value);
    let loan_to_value = value.filter(|v| *v > 0.0).map(|v| {
        round_to(current_loan.principal_balance / v * 100.0, 2)
    });

    let rate_difference = round_to(current_loan.interest_rate - market_rate, 3);
    let effective_rate = round_to(
        market_rate
            + (closing_costs / current_loan.principal_balance) * 100.0
                / (new_term_months as f64 / 12.0),
        3,
    );

    let break_even_within = |limit: u32| break_even_months.map_or(false, |m| m <= limit);

    let (should_refinance, recommendation) = if rate_difference >= 1.5 && npv > 0.0 {
        (true, "Strong refinancing opportunity")
    } else if rate_difference >= 0.75 && break_even_within(36) && npv > 0.0 {
        (true, "Refinancing recommended")
    } else if rate_difference >= 0.5 && break_even_within(24) && npv > 5_000.0 {
        (true, "Consider refinancing - marginal benefit")
    } else if rate_difference <= 0.0 {
        (false, "Do not refinance - no benefit at current rates")
    } else if npv <= 0.0 {
        (false, "Do not refinance - negative NPV")
    } else {
        (false, "Monitor rates - insufficient benefit currently")
    };

    let mut reasoning = vec![format!(
        "Current rate {:.2}% vs market rate {:.2}% ({:+.2} points)",
        current_loan.interest_rate, market_rate, -rate_difference
    )];
    if monthly_savings > 0.0 {
        reasoning.push(format!(
            "Refinancing saves {:.2}/month ({:.2} vs {:.2})",
            monthly_savings, new_payment, current_payment
        ));
    } else {
        reasoning.push(format!(
            "No monthly savings at the market rate ({:.2} vs {:.2})",
            new_payment, current_payment
        ));
    }
    match break_even_months {
        Some(months) => reasoning.push(format!(
            "Closing costs of {:.2} recovered in {} months",
            closing_costs, months
        )),
        None => reasoning.push(format!(
            "Closing costs of {:.2} are never recovered",
            closing_costs
        )),
    }
    reasoning.push(format!("Net present value of the switch: {:.2}", npv));

    let mut risk_factors = Vec::new();
    if let Some(ltv) = loan_to_value {
        if ltv > 80.0 {
            risk_factors.push(format!(
                "Loan-to-value of {:.1}% is above 80% and may limit refinancing options",
                ltv
            ));
        }
    }
    if let Some(months) = break_even_months {
        if months as f64 > remaining_months as f64 / 2.0 {
            risk_factors.push(
                "Break-even period exceeds half the remaining loan term".to_string(),
            );
        }
    }
    if market_rate < current_loan.interest_rate && total_interest_new > total_interest_current {
        risk_factors.push(
            "New term increases total interest paid despite the lower rate".to_string(),
        );
    }

    Ok(RefinancingOpportunity {
        should_refinance,
        current_rate: current_loan.interest_rate,
        market_rate,
        rate_difference,
        current_monthly_payment: current_payment,
        new_monthly_payment: new_payment,
        monthly_savings,
        closing_costs,
        break_even_months,
        npv,
        total_interest_current,
        total_interest_new,
        total_interest_savings,
        lifetime_savings,
        effective_rate,
        remaining_months,
        new_term_months,
        loan_to_value,
        recommendation: recommendation.to_string(),
        reasoning,
        risk_factors,
    })
}

/// Remaining months: explicit value, else origination date + term, else the
/// full term.
fn derive_remaining_months(loan: &LoanDetails) -> u32 {
    if let Some(months) = loan.remaining_months {
        return months.clamp(1, loan.term_length_months);
    }
    if let Some(originated) = loan.origination_date {
        let today = Utc::now().date_naive();
        let elapsed = (today.year() - originated.year()) * 12 + today.month() as i32
            - originated.month() as i32;
        let remaining = loan.term_length_months as i32 - elapsed.max(0);
        return remaining.clamp(1, loan.term_length_months as i32) as u32;
    }
    loan.term_length_months
}

/// Rate applicable to a loan, from the published table. Loan amount decides
/// jumbo pricing; otherwise the loan type is substring-matched.
pub fn get_applicable_market_rate(loan_type: &str, loan_amount: f64, rates: &MarketRates) -> f64 {
    if loan_amount > JUMBO_THRESHOLD {
        return rates.jumbo;
    }
    let kind = loan_type.to_lowercase();
    if kind.contains("fha") {
        rates.fha
    } else if kind.contains("va") {
        rates.va
    } else if kind.contains("commercial") {
        rates.commercial
    } else if kind.contains("15") {
        rates.conventional_15
    } else if kind.contains("20") {
        rates.conventional_20
    } else {
        rates.conventional_30
    }
}

/// Current published rates from the configured source. Failures propagate
/// as typed external errors; rates are never silently zeroed.
pub async fn get_current_market_rates(
    provider: &dyn RateProvider,
) -> Result<MarketRates, AppError> {
    let rates = provider.get_current_market_rates().await?;
    tracing::debug!(
        conventional_30 = rates.conventional_30,
        "fetched market rates"
    );
    Ok(rates)
}
