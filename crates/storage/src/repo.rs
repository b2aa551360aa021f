//! Typed CRUD operations over every entity in §3.
//!
//! Every public method suspends the calling async task on
//! [`tokio::task::spawn_blocking`] while the Diesel call runs on a blocking
//! worker thread; no stage holds the async executor during DB I/O, per §5.
//! Read operations open their own connection; writes that must observe
//! §3's invariants (duplicate-pointer cycles, single-writer Comparables and
//! Score rows) run inside a single transaction.

use carscout_model as m;
use chrono::{DateTime, Duration, Utc};
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::connection::Pool;
use crate::error::RepoError;
use crate::models::*;
use crate::schema::*;

/// The Storage Gateway: a cloneable handle over a connection pool.
#[derive(Clone)]
pub struct Storage {
    pool: Pool,
}

impl Storage {
    /// Wraps an existing connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, RepoError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, RepoError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepoError::TransientIo(e.to_string()))?
    }

    // ---- Source ----

    /// Looks up a `Source` by its stable name.
    pub async fn get_source_by_name(&self, name: String) -> Result<Option<m::Source>, RepoError> {
        self.blocking(move |conn| {
            let row = sources::table
                .filter(sources::name.eq(&name))
                .select(SourceRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    /// Inserts or updates a `Source` by its unique name. The surrogate id
    /// is never overwritten on conflict, since `raw_listings` and other
    /// tables hold it as a foreign key.
    pub async fn upsert_source(&self, source: m::Source) -> Result<m::Source, RepoError> {
        self.blocking(move |conn| {
            let row = NewSourceRow::from(&source);
            let out: SourceRow = diesel::insert_into(sources::table)
                .values(&row)
                .on_conflict(sources::name)
                .do_update()
                .set((
                    sources::base_url.eq(&row.base_url),
                    sources::enabled.eq(row.enabled),
                    sources::crawl_cadence_seconds.eq(row.crawl_cadence_seconds),
                ))
                .get_result(conn)?;
            Ok(out.into())
        })
        .await
    }

    // ---- RawListing ----

    /// Looks up a `RawListing` by its owning source and the marketplace's
    /// own ad id. The uniqueness this enforces is the basis of the Raw
    /// Ingestor's idempotent upsert (§4.2).
    pub async fn get_raw_listing_by_ad(
        &self,
        source_id: m::SourceId,
        site_ad_id: String,
    ) -> Result<Option<m::RawListing>, RepoError> {
        self.blocking(move |conn| {
            let row = raw_listings::table
                .filter(raw_listings::source_id.eq(source_id.as_uuid()))
                .filter(raw_listings::site_ad_id.eq(&site_ad_id))
                .select(RawListingRow::as_select())
                .first(conn)
                .optional()?;
            row.map(m::RawListing::try_from)
                .transpose()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Fetches a `RawListing` by id.
    pub async fn get_raw_listing(&self, id: m::RawListingId) -> Result<m::RawListing, RepoError> {
        self.blocking(move |conn| {
            let row = raw_listings::table
                .find(id.as_uuid())
                .select(RawListingRow::as_select())
                .first(conn)?;
            m::RawListing::try_from(row).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Inserts a brand-new `RawListing`. Callers must have already checked
    /// `(source, site_ad_id)` uniqueness via [`Self::get_raw_listing_by_ad`];
    /// a concurrent racing insert surfaces as a `TransientIo` conflict the
    /// Orchestrator retries, collapsing to a no-op per §5's "one winning and
    /// one no-op" rule.
    pub async fn insert_raw_listing(&self, listing: m::RawListing) -> Result<m::RawListing, RepoError> {
        self.blocking(move |conn| {
            let row = NewRawListingRow::try_from(&listing)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: RawListingRow = diesel::insert_into(raw_listings::table)
                .values(&row)
                .get_result(conn)?;
            m::RawListing::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Replaces a `RawListing` row in place (used for the Raw Ingestor's
    /// re-observation path: `last_seen`, merged `http_meta`, re-activation).
    pub async fn update_raw_listing(&self, listing: m::RawListing) -> Result<m::RawListing, RepoError> {
        self.blocking(move |conn| {
            let row = NewRawListingRow::try_from(&listing)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: RawListingRow = diesel::update(raw_listings::table.find(listing.id.as_uuid()))
                .set(&row)
                .get_result(conn)?;
            m::RawListing::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    // ---- NormalizedListing ----

    /// Looks up the `NormalizedListing` owned by a given `RawListing`, if
    /// the Normalizer has already run (§3: at most one per raw listing).
    pub async fn get_normalized_listing_by_raw(
        &self,
        raw_id: m::RawListingId,
    ) -> Result<Option<m::NormalizedListing>, RepoError> {
        self.blocking(move |conn| {
            let row = normalized_listings::table
                .filter(normalized_listings::raw_listing_id.eq(raw_id.as_uuid()))
                .select(NormalizedListingRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    /// Fetches a `NormalizedListing` by id.
    pub async fn get_normalized_listing(
        &self,
        id: m::NormalizedListingId,
    ) -> Result<m::NormalizedListing, RepoError> {
        self.blocking(move |conn| {
            let row = normalized_listings::table
                .find(id.as_uuid())
                .select(NormalizedListingRow::as_select())
                .first(conn)?;
            Ok(row.into())
        })
        .await
    }

    /// Inserts or replaces a `NormalizedListing`, enforcing the §3
    /// invariants that a duplicate's `canonical_of` must reference a
    /// non-duplicate row in the same Source, and that the duplicate graph
    /// stays acyclic. Takes a row-level lock on any existing row for this
    /// `raw_listing_id` before writing, per §5's shared-resource policy.
    pub async fn upsert_normalized_listing(
        &self,
        listing: m::NormalizedListing,
    ) -> Result<m::NormalizedListing, RepoError> {
        self.blocking(move |conn| {
            conn.transaction(|tx| {
                if listing.is_duplicate {
                    let Some(target_id) = listing.canonical_of else {
                        return Err(RepoError::Invariant(
                            "is_duplicate set without canonical_of".to_string(),
                        ));
                    };
                    if target_id == listing.id {
                        return Err(RepoError::Invariant(
                            "listing cannot be a duplicate of itself".to_string(),
                        ));
                    }
                    let target: NormalizedListingRow = normalized_listings::table
                        .find(target_id.as_uuid())
                        .select(NormalizedListingRow::as_select())
                        .for_update()
                        .first(tx)?;
                    if target.is_duplicate {
                        return Err(RepoError::Invariant(
                            "canonical_of must reference a non-duplicate listing".to_string(),
                        ));
                    }
                    if would_create_cycle(tx, listing.id, target_id)? {
                        return Err(RepoError::Invariant(
                            "duplicate-pointer would create a cycle".to_string(),
                        ));
                    }
                }

                let row = NewNormalizedListingRow::from(&listing);
                let out: NormalizedListingRow = diesel::insert_into(normalized_listings::table)
                    .values(&row)
                    .on_conflict(normalized_listings::id)
                    .do_update()
                    .set(&row)
                    .get_result(tx)?;
                Ok(out.into())
            })
        })
        .await
    }

    /// Selects peer listings for the Comparables Engine: same canonical
    /// brand/model, non-duplicate, priced, within the freshness horizon.
    /// Year/mileage/fuel/gearbox filtering is applied by the caller on the
    /// returned set so it can progressively relax filters per §4.6.
    pub async fn select_comparable_candidates(
        &self,
        brand: String,
        model: String,
        min_price: i64,
        freshness_cutoff: DateTime<Utc>,
    ) -> Result<Vec<m::NormalizedListing>, RepoError> {
        self.blocking(move |conn| {
            let rows: Vec<NormalizedListingRow> = normalized_listings::table
                .filter(normalized_listings::brand.eq(&brand))
                .filter(normalized_listings::model.eq(&model))
                .filter(normalized_listings::is_duplicate.eq(false))
                .filter(normalized_listings::price.is_not_null())
                .filter(normalized_listings::first_seen_at.ge(freshness_cutoff))
                .select(NormalizedListingRow::as_select())
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(m::NormalizedListing::from)
                .filter(|l| {
                    l.price
                        .map(|p| p >= rust_decimal::Decimal::from(min_price))
                        .unwrap_or(false)
                })
                .collect())
        })
        .await
    }

    /// Selects non-duplicate listings in the same Source as `source_id`,
    /// for the Deduplicator's title-trigram tier (§4.5, method 3).
    pub async fn select_dedupe_candidates_in_source(
        &self,
        source_id: m::SourceId,
    ) -> Result<Vec<m::NormalizedListing>, RepoError> {
        self.blocking(move |conn| {
            let rows: Vec<NormalizedListingRow> = normalized_listings::table
                .inner_join(raw_listings::table.on(raw_listings::id.eq(normalized_listings::raw_listing_id)))
                .filter(raw_listings::source_id.eq(source_id.as_uuid()))
                .filter(normalized_listings::is_duplicate.eq(false))
                .select(NormalizedListingRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    /// Selects non-duplicate listings attributed to `seller_id`, for the
    /// Deduplicator's phone-hash tier (§4.5, method 1).
    pub async fn select_listings_by_seller(
        &self,
        seller_id: m::SellerId,
    ) -> Result<Vec<m::NormalizedListing>, RepoError> {
        self.blocking(move |conn| {
            let rows: Vec<NormalizedListingRow> = normalized_listings::table
                .filter(normalized_listings::seller_id.eq(seller_id.as_uuid()))
                .filter(normalized_listings::is_duplicate.eq(false))
                .select(NormalizedListingRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    // ---- Seller ----

    /// Finds or creates a `Seller` by phone hash (first-observation
    /// lifecycle from §3).
    pub async fn get_or_create_seller(
        &self,
        phone_hash: String,
        name: Option<String>,
    ) -> Result<m::Seller, RepoError> {
        self.blocking(move |conn| {
            conn.transaction(|tx| {
                if let Some(existing) = sellers::table
                    .filter(sellers::phone_hash.eq(&phone_hash))
                    .select(SellerRow::as_select())
                    .first(tx)
                    .optional()?
                {
                    let updated: SellerRow = diesel::update(sellers::table.find(existing.id))
                        .set(sellers::contact_count.eq(sellers::contact_count + 1))
                        .get_result(tx)?;
                    return Ok(updated.into());
                }
                let row = NewSellerRow {
                    id: Uuid::new_v4(),
                    phone_hash,
                    name,
                    contact_count: 1,
                    blacklisted: false,
                };
                let out: SellerRow = diesel::insert_into(sellers::table)
                    .values(&row)
                    .get_result(tx)?;
                Ok(out.into())
            })
        })
        .await
    }

    /// Fetches a `Seller` by id.
    pub async fn get_seller(&self, id: m::SellerId) -> Result<m::Seller, RepoError> {
        self.blocking(move |conn| {
            let row = sellers::table
                .find(id.as_uuid())
                .select(SellerRow::as_select())
                .first(conn)?;
            Ok(row.into())
        })
        .await
    }

    // ---- PriceHistory ----

    /// Appends a `PriceHistory` row. Never updates or deletes existing rows.
    pub async fn insert_price_history(
        &self,
        entry: m::PriceHistoryEntry,
    ) -> Result<(), RepoError> {
        self.blocking(move |conn| {
            let row = NewPriceHistoryRow {
                id: Uuid::new_v4(),
                listing_id: entry.listing_id.as_uuid(),
                price: entry.price,
                observed_at: entry.observed_at,
            };
            diesel::insert_into(price_history::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Returns the most recently observed price for a listing, if any.
    pub async fn latest_price(
        &self,
        listing_id: m::NormalizedListingId,
    ) -> Result<Option<m::PriceHistoryEntry>, RepoError> {
        self.blocking(move |conn| {
            let row: Option<PriceHistoryRow> = price_history::table
                .filter(price_history::listing_id.eq(listing_id.as_uuid()))
                .order(price_history::observed_at.desc())
                .select(PriceHistoryRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    // ---- Comparables (single-writer via unique listing_id) ----

    /// Fetches the cached `Comparables` for a listing, if present.
    pub async fn get_comparables(
        &self,
        listing_id: m::NormalizedListingId,
    ) -> Result<Option<m::Comparables>, RepoError> {
        self.blocking(move |conn| {
            let row: Option<ComparablesRow> = comparables::table
                .find(listing_id.as_uuid())
                .select(ComparablesRow::as_select())
                .first(conn)
                .optional()?;
            row.map(m::Comparables::try_from)
                .transpose()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Upserts `Comparables` for a listing. Single-writer per §5: the
    /// unique `listing_id` primary key means readers always see either the
    /// old or new row, never a torn state.
    pub async fn put_comparables(&self, comp: m::Comparables) -> Result<m::Comparables, RepoError> {
        self.blocking(move |conn| {
            let row = NewComparablesRow::try_from(&comp)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: ComparablesRow = diesel::insert_into(comparables::table)
                .values(&row)
                .on_conflict(comparables::listing_id)
                .do_update()
                .set(&row)
                .get_result(conn)?;
            m::Comparables::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    // ---- Evaluation ----

    /// Fetches the `Evaluation` for a listing, if present.
    pub async fn get_evaluation(
        &self,
        listing_id: m::NormalizedListingId,
    ) -> Result<Option<m::Evaluation>, RepoError> {
        self.blocking(move |conn| {
            let row: Option<EvaluationRow> = evaluations::table
                .find(listing_id.as_uuid())
                .select(EvaluationRow::as_select())
                .first(conn)
                .optional()?;
            row.map(m::Evaluation::try_from)
                .transpose()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Upserts the `Evaluation` for a listing.
    pub async fn put_evaluation(&self, eval: m::Evaluation) -> Result<m::Evaluation, RepoError> {
        self.blocking(move |conn| {
            let row = NewEvaluationRow::try_from(&eval)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: EvaluationRow = diesel::insert_into(evaluations::table)
                .values(&row)
                .on_conflict(evaluations::listing_id)
                .do_update()
                .set(&row)
                .get_result(conn)?;
            m::Evaluation::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    // ---- Score (single-writer via unique listing_id) ----

    /// Fetches the `Score` for a listing, if present.
    pub async fn get_score(
        &self,
        listing_id: m::NormalizedListingId,
    ) -> Result<Option<m::Score>, RepoError> {
        self.blocking(move |conn| {
            let row: Option<ScoreRow> = scores::table
                .find(listing_id.as_uuid())
                .select(ScoreRow::as_select())
                .first(conn)
                .optional()?;
            row.map(m::Score::try_from)
                .transpose()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Upserts the `Score` for a listing in place. Per §4.7's idempotency
    /// guarantee, re-running with unchanged inputs produces a row that is
    /// bit-identical modulo `scored_at`.
    pub async fn put_score(&self, score: m::Score) -> Result<m::Score, RepoError> {
        self.blocking(move |conn| {
            let row = NewScoreRow::try_from(&score)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: ScoreRow = diesel::insert_into(scores::table)
                .values(&row)
                .on_conflict(scores::listing_id)
                .do_update()
                .set(&row)
                .get_result(conn)?;
            m::Score::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Selects approved listings whose `Score` is older than
    /// `staler_than_hours` and whose `NormalizedListing` is younger than
    /// `max_age_days`, for the Orchestrator's hourly rescore-stale sweep
    /// (§4.8).
    pub async fn select_stale_approved(
        &self,
        staler_than: DateTime<Utc>,
        youngest_first_seen: DateTime<Utc>,
    ) -> Result<Vec<m::NormalizedListingId>, RepoError> {
        self.blocking(move |conn| {
            let ids: Vec<Uuid> = scores::table
                .inner_join(
                    normalized_listings::table.on(normalized_listings::id.eq(scores::listing_id)),
                )
                .filter(scores::final_state.eq("approved"))
                .filter(scores::scored_at.lt(staler_than))
                .filter(normalized_listings::first_seen_at.ge(youngest_first_seen))
                .select(scores::listing_id)
                .load(conn)?;
            Ok(ids.into_iter().map(m::NormalizedListingId::from_uuid).collect())
        })
        .await
    }

    /// Selects listings active in the monitor's window: `last_seen_at` (via
    /// the owning raw listing) or a `PriceHistory` insert within the last
    /// `window`, and `first_seen_at` within `max_age`. Drives the Monitor's
    /// periodic pass (§4.8/§4.9).
    pub async fn select_recent_activity(
        &self,
        window_start: DateTime<Utc>,
        max_age_cutoff: DateTime<Utc>,
    ) -> Result<Vec<m::NormalizedListingId>, RepoError> {
        self.blocking(move |conn| {
            let from_raw: Vec<Uuid> = normalized_listings::table
                .inner_join(
                    raw_listings::table.on(raw_listings::id.eq(normalized_listings::raw_listing_id)),
                )
                .filter(raw_listings::last_seen_at.ge(window_start))
                .filter(normalized_listings::first_seen_at.ge(max_age_cutoff))
                .select(normalized_listings::id)
                .load(conn)?;

            let from_price: Vec<Uuid> = price_history::table
                .inner_join(
                    normalized_listings::table.on(normalized_listings::id.eq(price_history::listing_id)),
                )
                .filter(price_history::observed_at.ge(window_start))
                .filter(normalized_listings::first_seen_at.ge(max_age_cutoff))
                .select(normalized_listings::id)
                .load(conn)?;

            let mut ids: Vec<Uuid> = from_raw;
            ids.extend(from_price);
            ids.sort_unstable();
            ids.dedup();
            Ok(ids.into_iter().map(m::NormalizedListingId::from_uuid).collect())
        })
        .await
    }

    // ---- DedupeSignature / DuplicateLog ----

    /// Fetches the `DedupeSignature` for a listing, if one has been
    /// computed.
    pub async fn get_dedupe_signature(
        &self,
        listing_id: m::NormalizedListingId,
    ) -> Result<Option<m::DedupeSignature>, RepoError> {
        self.blocking(move |conn| {
            let row = dedupe_signatures::table
                .filter(dedupe_signatures::listing_id.eq(listing_id.as_uuid()))
                .select(DedupeSignatureRow::as_select())
                .first(conn)
                .optional()?;
            row.map(m::DedupeSignature::try_from)
                .transpose()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Upserts the `DedupeSignature` for a listing.
    pub async fn put_dedupe_signature(
        &self,
        sig: m::DedupeSignature,
    ) -> Result<m::DedupeSignature, RepoError> {
        self.blocking(move |conn| {
            let row = NewDedupeSignatureRow::try_from(&sig)
                .map_err(|e| RepoError::TransientIo(e.to_string()))?;
            let out: DedupeSignatureRow = diesel::insert_into(dedupe_signatures::table)
                .values(&row)
                .on_conflict(dedupe_signatures::listing_id)
                .do_update()
                .set(&row)
                .get_result(conn)?;
            m::DedupeSignature::try_from(out).map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    /// Appends a `DuplicateLog` row recording a dedupe decision.
    pub async fn insert_duplicate_log(&self, entry: m::DuplicateLog) -> Result<(), RepoError> {
        self.blocking(move |conn| {
            let row = NewDuplicateLogRow::from(&entry);
            diesel::insert_into(duplicate_log::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    // ---- CanonicalBrandModel ----

    /// Loads the full, active `CanonicalBrandModel` table for in-process
    /// caching at stage-worker startup, per §5's shared-resource policy.
    pub async fn load_canonical_brand_models(
        &self,
    ) -> Result<Vec<m::CanonicalBrandModel>, RepoError> {
        self.blocking(move |conn| {
            let rows: Vec<CanonicalBrandModelRow> = canonical_brand_models::table
                .filter(canonical_brand_models::active.eq(true))
                .select(CanonicalBrandModelRow::as_select())
                .load(conn)?;
            rows.into_iter()
                .map(m::CanonicalBrandModel::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| RepoError::TransientIo(e.to_string()))
        })
        .await
    }

    // ---- Stage queue (durable broker, §4.8/§5) ----

    /// Enqueues a work unit for `stage` on `listing_id`, available
    /// immediately. Idempotent: a unit already queued or leased for the
    /// same `(stage, listing_id)` is left untouched rather than
    /// duplicated, since stage re-entrancy is handled by re-emitting the
    /// fan-out rather than by queue depth.
    pub async fn enqueue_stage(&self, stage: String, listing_id: Uuid) -> Result<(), RepoError> {
        self.blocking(move |conn| {
            let now = Utc::now();
            let row = NewStageQueueRow {
                id: Uuid::new_v4(),
                stage,
                listing_id,
                state: "queued".to_string(),
                available_at: now,
                created_at: now,
            };
            diesel::insert_into(stage_queue::table)
                .values(&row)
                .on_conflict((stage_queue::stage, stage_queue::listing_id))
                .do_nothing()
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Leases up to `limit` queued-or-expired work units for `stage`,
    /// mirroring the teacher's `gaps_lease`: select candidates, then
    /// re-check and claim them inside one `immediate_transaction` so two
    /// racing workers never lease the same unit.
    pub async fn lease_stage_units(
        &self,
        stage: String,
        owner: String,
        limit: i64,
        ttl: Duration,
    ) -> Result<Vec<(Uuid, Uuid, i32)>, RepoError> {
        self.blocking(move |conn| {
            conn.transaction(|tx| {
                let now = Utc::now();
                let candidates: Vec<Uuid> = stage_queue::table
                    .filter(stage_queue::stage.eq(&stage))
                    .filter(
                        stage_queue::state
                            .eq("queued")
                            .or(stage_queue::state
                                .eq("leased")
                                .and(stage_queue::lease_expires_at.lt(now))),
                    )
                    .filter(stage_queue::available_at.le(now))
                    .order(stage_queue::created_at.asc())
                    .limit(limit)
                    .select(stage_queue::id)
                    .load(tx)?;

                if candidates.is_empty() {
                    return Ok(Vec::new());
                }

                let expires = now + ttl;
                diesel::update(
                    stage_queue::table.filter(stage_queue::id.eq_any(&candidates)),
                )
                .set((
                    stage_queue::state.eq("leased"),
                    stage_queue::lease_owner.eq(&owner),
                    stage_queue::lease_expires_at.eq(expires),
                    stage_queue::attempts.eq(stage_queue::attempts + 1),
                ))
                .execute(tx)?;

                let leased: Vec<(Uuid, Uuid, i32)> = stage_queue::table
                    .filter(stage_queue::id.eq_any(&candidates))
                    .select((stage_queue::id, stage_queue::listing_id, stage_queue::attempts))
                    .load(tx)?;
                Ok(leased)
            })
        })
        .await
    }

    /// Marks a leased work unit done, removing it from future leasing.
    pub async fn complete_stage_unit(&self, id: Uuid) -> Result<(), RepoError> {
        self.blocking(move |conn| {
            diesel::update(stage_queue::table.find(id))
                .set(stage_queue::state.eq("done"))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Records a failed attempt. Transient failures re-queue with the
    /// given `available_at` (the Orchestrator computes this from its
    /// backoff policy); permanent failures set `state = "failed"`.
    pub async fn fail_stage_unit(
        &self,
        id: Uuid,
        retryable: bool,
        available_at: DateTime<Utc>,
        error: String,
    ) -> Result<(), RepoError> {
        self.blocking(move |conn| {
            let new_state = if retryable { "queued" } else { "failed" };
            diesel::update(stage_queue::table.find(id))
                .set((
                    stage_queue::state.eq(new_state),
                    stage_queue::available_at.eq(available_at),
                    stage_queue::last_error.eq(error),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}

/// Walks the `canonical_of` chain starting from `target` to check whether
/// it ever reaches `origin`, which would make `origin -> target` close a
/// cycle. Bounded by table size; in practice chains are compressed to
/// length 1 by [`Storage::upsert_normalized_listing`]'s non-duplicate-root
/// check, so this only ever inspects a handful of rows.
fn would_create_cycle(
    conn: &mut PgConnection,
    origin: m::NormalizedListingId,
    target: m::NormalizedListingId,
) -> Result<bool, RepoError> {
    let mut current = target;
    loop {
        if current == origin {
            return Ok(true);
        }
        let next: Option<Uuid> = normalized_listings::table
            .find(current.as_uuid())
            .select(normalized_listings::canonical_of)
            .first(conn)?;
        match next {
            Some(n) => current = m::NormalizedListingId::from_uuid(n),
            None => return Ok(false),
        }
    }
}
