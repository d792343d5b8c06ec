//! GraphQL documents used by the account client.

use serde_json::json;

use crate::browser::GqlOperation;
use crate::config::CampaignConfig;

pub const DAILY_CHECKIN_OPERATION: &str = "upsertDailyCheckin";
pub const DAILY_CHECKIN_MUTATION: &str = "mutation upsertDailyCheckin($object: DailyCheckinInput!) { daily_checkin(point_source_data: $object) { id } }";

pub const APPLY_REFERRAL_OPERATION: &str = "updateReferralCode";
pub const APPLY_REFERRAL_MUTATION: &str = "mutation updateReferralCode($applyReferralCodeInput: ApplyReferralCodeInput!) { apply_referral_code(referral_code_data: $applyReferralCodeInput) { success } }";

pub const REFERRAL_STATS_OPERATION: &str = "GetUserReferral";
pub const REFERRAL_STATS_QUERY: &str = "query GetUserReferral($numberOfReferralsData: NumberOfReferralsInput!) { get_number_of_referrals(number_of_referrals_data: $numberOfReferralsData) { referral_code referral_count } }";

pub fn daily_checkin(user_id: &str, campaign: &CampaignConfig) -> GqlOperation {
    GqlOperation::new(
        DAILY_CHECKIN_OPERATION,
        DAILY_CHECKIN_MUTATION,
        json!({
            "object": {
                "user_id": user_id,
                "client_season": campaign.client_season,
                "point_source_id": campaign.daily_checkin_source_id,
                "status": "SUCCESS",
            }
        }),
    )
}

pub fn apply_referral(user_id: &str, code: &str) -> GqlOperation {
    GqlOperation::new(
        APPLY_REFERRAL_OPERATION,
        APPLY_REFERRAL_MUTATION,
        json!({
            "applyReferralCodeInput": {
                "referral_code": code,
                "user_id": user_id,
            }
        }),
    )
}

pub fn referral_stats(user_id: &str) -> GqlOperation {
    GqlOperation::new(
        REFERRAL_STATS_OPERATION,
        REFERRAL_STATS_QUERY,
        json!({ "numberOfReferralsData": { "user_id": user_id } }),
    )
}
