//! Diesel models mapping to the database schema, plus conversions to and
//! from the domain types in `carscout-model`.
//!
//! Closed-set enums (`FuelType`, `GearboxType`, `BodyType`, `RiskLevel`,
//! `FinalState`, `DedupeMethod`, `MarketPosition`) are stored as their
//! snake_case string tag and parsed back on read; an unrecognized tag is
//! treated as `None`/mapped defensively rather than failing the query.

use carscout_model as m;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value as Json;
use uuid::Uuid;

use crate::schema::*;

fn fuel_to_str(f: m::FuelType) -> &'static str {
    match f {
        m::FuelType::Diesel => "diesel",
        m::FuelType::Petrol => "petrol",
        m::FuelType::Lpg => "lpg",
        m::FuelType::Cng => "cng",
        m::FuelType::Electric => "electric",
        m::FuelType::Hybrid => "hybrid",
    }
}

fn fuel_from_str(s: &str) -> Option<m::FuelType> {
    match s {
        "diesel" => Some(m::FuelType::Diesel),
        "petrol" => Some(m::FuelType::Petrol),
        "lpg" => Some(m::FuelType::Lpg),
        "cng" => Some(m::FuelType::Cng),
        "electric" => Some(m::FuelType::Electric),
        "hybrid" => Some(m::FuelType::Hybrid),
        _ => None,
    }
}

fn gearbox_to_str(g: m::GearboxType) -> &'static str {
    match g {
        m::GearboxType::Automatic => "automatic",
        m::GearboxType::Manual => "manual",
        m::GearboxType::SemiAutomatic => "semi_automatic",
    }
}

fn gearbox_from_str(s: &str) -> Option<m::GearboxType> {
    match s {
        "automatic" => Some(m::GearboxType::Automatic),
        "manual" => Some(m::GearboxType::Manual),
        "semi_automatic" => Some(m::GearboxType::SemiAutomatic),
        _ => None,
    }
}

fn body_to_str(b: m::BodyType) -> &'static str {
    match b {
        m::BodyType::Sedan => "sedan",
        m::BodyType::Hatchback => "hatchback",
        m::BodyType::Wagon => "wagon",
        m::BodyType::Suv => "suv",
        m::BodyType::Convertible => "convertible",
        m::BodyType::Coupe => "coupe",
        m::BodyType::Van => "van",
        m::BodyType::Pickup => "pickup",
    }
}

fn body_from_str(s: &str) -> Option<m::BodyType> {
    match s {
        "sedan" => Some(m::BodyType::Sedan),
        "hatchback" => Some(m::BodyType::Hatchback),
        "wagon" => Some(m::BodyType::Wagon),
        "suv" => Some(m::BodyType::Suv),
        "convertible" => Some(m::BodyType::Convertible),
        "coupe" => Some(m::BodyType::Coupe),
        "van" => Some(m::BodyType::Van),
        "pickup" => Some(m::BodyType::Pickup),
        _ => None,
    }
}

// ---- sources ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = sources, check_for_backend(diesel::pg::Pg))]
pub struct SourceRow {
    pub id: Uuid,
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    pub crawl_cadence_seconds: i64,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = sources)]
pub struct NewSourceRow {
    pub id: Uuid,
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    pub crawl_cadence_seconds: i64,
}

impl From<SourceRow> for m::Source {
    fn from(r: SourceRow) -> Self {
        m::Source {
            id: m::SourceId::from_uuid(r.id),
            name: r.name,
            base_url: r.base_url,
            enabled: r.enabled,
            crawl_cadence_seconds: r.crawl_cadence_seconds,
        }
    }
}

impl From<&m::Source> for NewSourceRow {
    fn from(s: &m::Source) -> Self {
        NewSourceRow {
            id: s.id.as_uuid(),
            name: s.name.clone(),
            base_url: s.base_url.clone(),
            enabled: s.enabled,
            crawl_cadence_seconds: s.crawl_cadence_seconds,
        }
    }
}

// ---- raw_listings ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = raw_listings, check_for_backend(diesel::pg::Pg))]
pub struct RawListingRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub site_ad_id: String,
    pub url: String,
    pub raw_html: Option<String>,
    pub parsed_map: Option<Json>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub active: bool,
    pub http_status: Option<i32>,
    pub http_etag: Option<String>,
    pub http_last_modified: Option<String>,
    pub parse_errors: Option<String>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = raw_listings)]
pub struct NewRawListingRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub site_ad_id: String,
    pub url: String,
    pub raw_html: Option<String>,
    pub parsed_map: Option<Json>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub active: bool,
    pub http_status: Option<i32>,
    pub http_etag: Option<String>,
    pub http_last_modified: Option<String>,
    pub parse_errors: Option<String>,
}

impl TryFrom<RawListingRow> for m::RawListing {
    type Error = serde_json::Error;

    fn try_from(r: RawListingRow) -> Result<Self, Self::Error> {
        let parsed_map = r
            .parsed_map
            .map(serde_json::from_value::<m::FieldMap>)
            .transpose()?;
        Ok(m::RawListing {
            id: m::RawListingId::from_uuid(r.id),
            source_id: m::SourceId::from_uuid(r.source_id),
            site_ad_id: r.site_ad_id,
            url: r.url,
            raw_html: r.raw_html,
            parsed_map,
            first_seen_at: r.first_seen_at,
            last_seen_at: r.last_seen_at,
            active: r.active,
            http_meta: m::HttpMeta {
                status: r.http_status.map(|s| s as u16),
                etag: r.http_etag,
                last_modified: r.http_last_modified,
            },
            parse_errors: r.parse_errors,
        })
    }
}

impl TryFrom<&m::RawListing> for NewRawListingRow {
    type Error = serde_json::Error;

    fn try_from(l: &m::RawListing) -> Result<Self, Self::Error> {
        Ok(NewRawListingRow {
            id: l.id.as_uuid(),
            source_id: l.source_id.as_uuid(),
            site_ad_id: l.site_ad_id.clone(),
            url: l.url.clone(),
            raw_html: l.raw_html.clone(),
            parsed_map: l.parsed_map.clone().map(|m| serde_json::to_value(m)).transpose()?,
            first_seen_at: l.first_seen_at,
            last_seen_at: l.last_seen_at,
            active: l.active,
            http_status: l.http_meta.status.map(|s| s as i32),
            http_etag: l.http_meta.etag.clone(),
            http_last_modified: l.http_meta.last_modified.clone(),
            parse_errors: l.parse_errors.clone(),
        })
    }
}

// ---- sellers ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = sellers, check_for_backend(diesel::pg::Pg))]
pub struct SellerRow {
    pub id: Uuid,
    pub phone_hash: String,
    pub name: Option<String>,
    pub contact_count: i64,
    pub blacklisted: bool,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = sellers)]
pub struct NewSellerRow {
    pub id: Uuid,
    pub phone_hash: String,
    pub name: Option<String>,
    pub contact_count: i64,
    pub blacklisted: bool,
}

impl From<SellerRow> for m::Seller {
    fn from(r: SellerRow) -> Self {
        m::Seller {
            id: m::SellerId::from_uuid(r.id),
            phone_hash: r.phone_hash,
            name: r.name,
            contact_count: r.contact_count,
            blacklisted: r.blacklisted,
        }
    }
}

impl From<&m::Seller> for NewSellerRow {
    fn from(s: &m::Seller) -> Self {
        NewSellerRow {
            id: s.id.as_uuid(),
            phone_hash: s.phone_hash.clone(),
            name: s.name.clone(),
            contact_count: s.contact_count,
            blacklisted: s.blacklisted,
        }
    }
}

// ---- normalized_listings ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = normalized_listings, check_for_backend(diesel::pg::Pg))]
pub struct NormalizedListingRow {
    pub id: Uuid,
    pub raw_listing_id: Uuid,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub fuel: Option<String>,
    pub gearbox: Option<String>,
    pub body: Option<String>,
    pub price: Option<Decimal>,
    pub region: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub description_hash: Option<String>,
    pub version: i64,
    pub is_duplicate: bool,
    pub canonical_of: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = normalized_listings)]
pub struct NewNormalizedListingRow {
    pub id: Uuid,
    pub raw_listing_id: Uuid,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub fuel: Option<String>,
    pub gearbox: Option<String>,
    pub body: Option<String>,
    pub price: Option<Decimal>,
    pub region: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub description_hash: Option<String>,
    pub version: i64,
    pub is_duplicate: bool,
    pub canonical_of: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub first_seen_at: DateTime<Utc>,
}

impl From<NormalizedListingRow> for m::NormalizedListing {
    fn from(r: NormalizedListingRow) -> Self {
        m::NormalizedListing {
            id: m::NormalizedListingId::from_uuid(r.id),
            raw_listing_id: m::RawListingId::from_uuid(r.raw_listing_id),
            brand: r.brand,
            model: r.model,
            year: r.year,
            mileage: r.mileage,
            fuel: r.fuel.as_deref().and_then(fuel_from_str),
            gearbox: r.gearbox.as_deref().and_then(gearbox_from_str),
            body: r.body.as_deref().and_then(body_from_str),
            price: r.price,
            region: r.region,
            title: r.title,
            description: r.description,
            description_hash: r.description_hash,
            version: r.version,
            is_duplicate: r.is_duplicate,
            canonical_of: r.canonical_of.map(m::NormalizedListingId::from_uuid),
            seller_id: r.seller_id.map(m::SellerId::from_uuid),
            first_seen_at: r.first_seen_at,
        }
    }
}

impl From<&m::NormalizedListing> for NewNormalizedListingRow {
    fn from(l: &m::NormalizedListing) -> Self {
        NewNormalizedListingRow {
            id: l.id.as_uuid(),
            raw_listing_id: l.raw_listing_id.as_uuid(),
            brand: l.brand.clone(),
            model: l.model.clone(),
            year: l.year,
            mileage: l.mileage,
            fuel: l.fuel.map(fuel_to_str).map(str::to_string),
            gearbox: l.gearbox.map(gearbox_to_str).map(str::to_string),
            body: l.body.map(body_to_str).map(str::to_string),
            price: l.price,
            region: l.region.clone(),
            title: l.title.clone(),
            description: l.description.clone(),
            description_hash: l.description_hash.clone(),
            version: l.version,
            is_duplicate: l.is_duplicate,
            canonical_of: l.canonical_of.map(|id| id.as_uuid()),
            seller_id: l.seller_id.map(|id| id.as_uuid()),
            first_seen_at: l.first_seen_at,
        }
    }
}

// ---- price_history ----

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = price_history, check_for_backend(diesel::pg::Pg))]
pub struct PriceHistoryRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = price_history)]
pub struct NewPriceHistoryRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl From<PriceHistoryRow> for m::PriceHistoryEntry {
    fn from(r: PriceHistoryRow) -> Self {
        m::PriceHistoryEntry {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            price: r.price,
            observed_at: r.observed_at,
        }
    }
}

// ---- comparables ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = comparables, primary_key(listing_id), check_for_backend(diesel::pg::Pg))]
pub struct ComparablesRow {
    pub listing_id: Uuid,
    pub sample_size: i32,
    pub mean: f64,
    pub std_dev: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub discount_pct: f64,
    pub market_position: String,
    pub confidence: f64,
    pub feature_vector: Json,
    pub model_version: String,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = comparables)]
pub struct NewComparablesRow {
    pub listing_id: Uuid,
    pub sample_size: i32,
    pub mean: f64,
    pub std_dev: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub discount_pct: f64,
    pub market_position: String,
    pub confidence: f64,
    pub feature_vector: Json,
    pub model_version: String,
    pub computed_at: DateTime<Utc>,
}

fn market_position_to_str(p: m::comparables::MarketPosition) -> &'static str {
    use m::comparables::MarketPosition::*;
    match p {
        VeryCheap => "very_cheap",
        Cheap => "cheap",
        Average => "average",
        Expensive => "expensive",
    }
}

fn market_position_from_str(s: &str) -> m::comparables::MarketPosition {
    use m::comparables::MarketPosition::*;
    match s {
        "very_cheap" => VeryCheap,
        "cheap" => Cheap,
        "expensive" => Expensive,
        _ => Average,
    }
}

impl TryFrom<ComparablesRow> for m::Comparables {
    type Error = serde_json::Error;

    fn try_from(r: ComparablesRow) -> Result<Self, Self::Error> {
        Ok(m::Comparables {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            sample_size: r.sample_size as usize,
            mean: r.mean,
            std_dev: r.std_dev,
            p10: r.p10,
            p25: r.p25,
            p50: r.p50,
            p75: r.p75,
            p90: r.p90,
            discount_pct: r.discount_pct,
            market_position: market_position_from_str(&r.market_position),
            confidence: r.confidence,
            feature_vector: serde_json::from_value(r.feature_vector)?,
            model_version: r.model_version,
            computed_at: r.computed_at,
        })
    }
}

impl TryFrom<&m::Comparables> for NewComparablesRow {
    type Error = serde_json::Error;

    fn try_from(c: &m::Comparables) -> Result<Self, Self::Error> {
        Ok(NewComparablesRow {
            listing_id: c.listing_id.as_uuid(),
            sample_size: c.sample_size as i32,
            mean: c.mean,
            std_dev: c.std_dev,
            p10: c.p10,
            p25: c.p25,
            p50: c.p50,
            p75: c.p75,
            p90: c.p90,
            discount_pct: c.discount_pct,
            market_position: market_position_to_str(c.market_position).to_string(),
            confidence: c.confidence,
            feature_vector: serde_json::to_value(&c.feature_vector)?,
            model_version: c.model_version.clone(),
            computed_at: c.computed_at,
        })
    }
}

// ---- evaluations ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = evaluations, primary_key(listing_id), check_for_backend(diesel::pg::Pg))]
pub struct EvaluationRow {
    pub listing_id: Uuid,
    pub red_flags: Json,
    pub risk_level: String,
    pub llm_summary: Option<String>,
    pub rule_confidence: f64,
    pub llm_confidence: Option<f64>,
    pub rule_model_version: String,
    pub llm_model_version: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = evaluations)]
pub struct NewEvaluationRow {
    pub listing_id: Uuid,
    pub red_flags: Json,
    pub risk_level: String,
    pub llm_summary: Option<String>,
    pub rule_confidence: f64,
    pub llm_confidence: Option<f64>,
    pub rule_model_version: String,
    pub llm_model_version: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

fn risk_level_to_str(r: m::RiskLevel) -> &'static str {
    match r {
        m::RiskLevel::Low => "low",
        m::RiskLevel::Medium => "medium",
        m::RiskLevel::High => "high",
    }
}

fn risk_level_from_str(s: &str) -> m::RiskLevel {
    match s {
        "medium" => m::RiskLevel::Medium,
        "high" => m::RiskLevel::High,
        _ => m::RiskLevel::Low,
    }
}

impl TryFrom<EvaluationRow> for m::Evaluation {
    type Error = serde_json::Error;

    fn try_from(r: EvaluationRow) -> Result<Self, Self::Error> {
        Ok(m::Evaluation {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            red_flags: serde_json::from_value(r.red_flags)?,
            risk_level: risk_level_from_str(&r.risk_level),
            llm_summary: r.llm_summary,
            rule_confidence: r.rule_confidence,
            llm_confidence: r.llm_confidence,
            rule_model_version: r.rule_model_version,
            llm_model_version: r.llm_model_version,
            evaluated_at: r.evaluated_at,
        })
    }
}

impl TryFrom<&m::Evaluation> for NewEvaluationRow {
    type Error = serde_json::Error;

    fn try_from(e: &m::Evaluation) -> Result<Self, Self::Error> {
        Ok(NewEvaluationRow {
            listing_id: e.listing_id.as_uuid(),
            red_flags: serde_json::to_value(&e.red_flags)?,
            risk_level: risk_level_to_str(e.risk_level).to_string(),
            llm_summary: e.llm_summary.clone(),
            rule_confidence: e.rule_confidence,
            llm_confidence: e.llm_confidence,
            rule_model_version: e.rule_model_version.clone(),
            llm_model_version: e.llm_model_version.clone(),
            evaluated_at: e.evaluated_at,
        })
    }
}

// ---- scores ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = scores, primary_key(listing_id), check_for_backend(diesel::pg::Pg))]
pub struct ScoreRow {
    pub listing_id: Uuid,
    pub value: f64,
    pub reasons: Json,
    pub freshness_bonus: f64,
    pub liquidity_factor: f64,
    pub risk_penalty: f64,
    pub final_state: String,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = scores)]
pub struct NewScoreRow {
    pub listing_id: Uuid,
    pub value: f64,
    pub reasons: Json,
    pub freshness_bonus: f64,
    pub liquidity_factor: f64,
    pub risk_penalty: f64,
    pub final_state: String,
    pub scored_at: DateTime<Utc>,
}

fn final_state_to_str(s: m::FinalState) -> &'static str {
    match s {
        m::FinalState::Draft => "draft",
        m::FinalState::Approved => "approved",
        m::FinalState::Rejected => "rejected",
    }
}

fn final_state_from_str(s: &str) -> m::FinalState {
    match s {
        "approved" => m::FinalState::Approved,
        "rejected" => m::FinalState::Rejected,
        _ => m::FinalState::Draft,
    }
}

impl TryFrom<ScoreRow> for m::Score {
    type Error = serde_json::Error;

    fn try_from(r: ScoreRow) -> Result<Self, Self::Error> {
        Ok(m::Score {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            value: r.value,
            reasons: serde_json::from_value(r.reasons)?,
            freshness_bonus: r.freshness_bonus,
            liquidity_factor: r.liquidity_factor,
            risk_penalty: r.risk_penalty,
            final_state: final_state_from_str(&r.final_state),
            scored_at: r.scored_at,
        })
    }
}

impl TryFrom<&m::Score> for NewScoreRow {
    type Error = serde_json::Error;

    fn try_from(s: &m::Score) -> Result<Self, Self::Error> {
        Ok(NewScoreRow {
            listing_id: s.listing_id.as_uuid(),
            value: s.value,
            reasons: serde_json::to_value(&s.reasons)?,
            freshness_bonus: s.freshness_bonus,
            liquidity_factor: s.liquidity_factor,
            risk_penalty: s.risk_penalty,
            final_state: final_state_to_str(s.final_state).to_string(),
            scored_at: s.scored_at,
        })
    }
}

// ---- dedupe_signatures ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = dedupe_signatures, primary_key(listing_id), check_for_backend(diesel::pg::Pg))]
pub struct DedupeSignatureRow {
    pub listing_id: Uuid,
    pub title_trigram_source: String,
    pub title_minhash: Json,
    pub description_minhash: Json,
    pub first_image_phash: Option<i64>,
    pub text_embedding: Option<Json>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = dedupe_signatures)]
pub struct NewDedupeSignatureRow {
    pub listing_id: Uuid,
    pub title_trigram_source: String,
    pub title_minhash: Json,
    pub description_minhash: Json,
    pub first_image_phash: Option<i64>,
    pub text_embedding: Option<Json>,
}

impl TryFrom<DedupeSignatureRow> for m::DedupeSignature {
    type Error = serde_json::Error;

    fn try_from(r: DedupeSignatureRow) -> Result<Self, Self::Error> {
        Ok(m::DedupeSignature {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            title_trigram_source: r.title_trigram_source,
            title_minhash: serde_json::from_value(r.title_minhash)?,
            description_minhash: serde_json::from_value(r.description_minhash)?,
            first_image_phash: r.first_image_phash.map(|v| v as u64),
            text_embedding: r.text_embedding.map(serde_json::from_value).transpose()?,
        })
    }
}

impl TryFrom<&m::DedupeSignature> for NewDedupeSignatureRow {
    type Error = serde_json::Error;

    fn try_from(s: &m::DedupeSignature) -> Result<Self, Self::Error> {
        Ok(NewDedupeSignatureRow {
            listing_id: s.listing_id.as_uuid(),
            title_trigram_source: s.title_trigram_source.clone(),
            title_minhash: serde_json::to_value(&s.title_minhash)?,
            description_minhash: serde_json::to_value(&s.description_minhash)?,
            first_image_phash: s.first_image_phash.map(|v| v as i64),
            text_embedding: s.text_embedding.clone().map(|v| serde_json::to_value(v)).transpose()?,
        })
    }
}

// ---- duplicate_log ----

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = duplicate_log, check_for_backend(diesel::pg::Pg))]
pub struct DuplicateLogRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub canonical_of: Uuid,
    pub method: String,
    pub score: f64,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = duplicate_log)]
pub struct NewDuplicateLogRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub canonical_of: Uuid,
    pub method: String,
    pub score: f64,
    pub decided_at: DateTime<Utc>,
}

fn dedupe_method_to_str(method: m::DedupeMethod) -> &'static str {
    match method {
        m::DedupeMethod::SellerPhoneMatch => "seller_phone_match",
        m::DedupeMethod::ImagePhashMatch => "image_phash_match",
        m::DedupeMethod::TitleTrigramMatch => "title_trigram_match",
        m::DedupeMethod::EmbeddingMatch => "embedding_match",
    }
}

fn dedupe_method_from_str(s: &str) -> m::DedupeMethod {
    match s {
        "seller_phone_match" => m::DedupeMethod::SellerPhoneMatch,
        "image_phash_match" => m::DedupeMethod::ImagePhashMatch,
        "embedding_match" => m::DedupeMethod::EmbeddingMatch,
        _ => m::DedupeMethod::TitleTrigramMatch,
    }
}

impl From<DuplicateLogRow> for m::DuplicateLog {
    fn from(r: DuplicateLogRow) -> Self {
        m::DuplicateLog {
            listing_id: m::NormalizedListingId::from_uuid(r.listing_id),
            canonical_of: m::NormalizedListingId::from_uuid(r.canonical_of),
            method: dedupe_method_from_str(&r.method),
            score: r.score,
            decided_at: r.decided_at,
        }
    }
}

impl From<&m::DuplicateLog> for NewDuplicateLogRow {
    fn from(l: &m::DuplicateLog) -> Self {
        NewDuplicateLogRow {
            id: Uuid::new_v4(),
            listing_id: l.listing_id.as_uuid(),
            canonical_of: l.canonical_of.as_uuid(),
            method: dedupe_method_to_str(l.method).to_string(),
            score: l.score,
            decided_at: l.decided_at,
        }
    }
}

// ---- canonical_brand_models ----

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = canonical_brand_models, check_for_backend(diesel::pg::Pg))]
pub struct CanonicalBrandModelRow {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub locale: String,
    pub canonical_brand: String,
    pub canonical_model: String,
    pub aliases: Json,
    pub active: bool,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = canonical_brand_models)]
pub struct NewCanonicalBrandModelRow {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub locale: String,
    pub canonical_brand: String,
    pub canonical_model: String,
    pub aliases: Json,
    pub active: bool,
}

impl TryFrom<CanonicalBrandModelRow> for m::CanonicalBrandModel {
    type Error = serde_json::Error;

    fn try_from(r: CanonicalBrandModelRow) -> Result<Self, Self::Error> {
        Ok(m::CanonicalBrandModel {
            brand: r.brand,
            model: r.model,
            locale: r.locale,
            canonical_brand: r.canonical_brand,
            canonical_model: r.canonical_model,
            aliases: serde_json::from_value(r.aliases)?,
            active: r.active,
        })
    }
}

impl TryFrom<&m::CanonicalBrandModel> for NewCanonicalBrandModelRow {
    type Error = serde_json::Error;

    fn try_from(c: &m::CanonicalBrandModel) -> Result<Self, Self::Error> {
        Ok(NewCanonicalBrandModelRow {
            id: Uuid::new_v4(),
            brand: c.brand.clone(),
            model: c.model.clone(),
            locale: c.locale.clone(),
            canonical_brand: c.canonical_brand.clone(),
            canonical_model: c.canonical_model.clone(),
            aliases: serde_json::to_value(&c.aliases)?,
            active: c.active,
        })
    }
}

// ---- stage_queue ----

/// A durable work-unit row: one `(stage, listing_id)` pair, per spec §4.8.
#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset, Selectable)]
#[diesel(table_name = stage_queue, check_for_backend(diesel::pg::Pg))]
pub struct StageQueueRow {
    pub id: Uuid,
    pub stage: String,
    pub listing_id: Uuid,
    pub state: String,
    pub attempts: i32,
    pub available_at: DateTime<Utc>,
    pub lease_owner: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stage_queue)]
pub struct NewStageQueueRow {
    pub id: Uuid,
    pub stage: String,
    pub listing_id: Uuid,
    pub state: String,
    pub available_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
