//! Axum route handlers for the admin console: roster listing, selection,
//! user creation, status/owner edits and the bulk lead assignment.
//!
//! Every mutation reports an explicit commit outcome and the shared roster
//! is only touched after the commit is confirmed. In demo mode commits are
//! local-only and flagged `durable: false`.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::accounts::demo::OWNERS;
use crate::accounts::feed;
use crate::accounts::models::{BillingStatus, CommitOutcome, UserRecord, UNASSIGNED_OWNER};
use crate::accounts::repo;
use crate::accounts::roster::RosterEvent;
use crate::auth::handlers::is_valid_email;
use crate::auth::role::Role;
use crate::auth::session::{CurrentSession, RequireAdmin, RequireStaff};
use crate::errors::AppError;
use crate::listing::{self, Paged};
use crate::state::AppState;

const ALLOWED_PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];
const DEFAULT_PAGE_SIZE: usize = 10;

/// Display name a manager's leads are keyed by. Real sessions carry it in
/// their metadata; the manager override uses the sentinel.
const MANAGER_SENTINEL_NAME: &str = "Sarah Johnson";

fn manager_scope(session: &CurrentSession) -> Option<String> {
    match session.role {
        Role::Manager => Some(
            session
                .full_name
                .clone()
                .unwrap_or_else(|| MANAGER_SENTINEL_NAME.to_string()),
        ),
        _ => None,
    }
}

/// Loads the roster on first use; the change feed keeps it fresh afterward.
async fn ensure_loaded(state: &AppState) {
    if !state.roster.is_loaded() {
        feed::refresh(state).await;
    }
}

/// Managers may only mutate their own leads; admins pass through. An
/// unknown id falls through to the mutation path's own not-found handling.
fn ensure_in_scope(
    roster: &crate::accounts::roster::Roster,
    id: &str,
    scope: Option<&str>,
) -> Result<(), AppError> {
    let Some(owner) = scope else {
        return Ok(());
    };
    match roster.snapshot().into_iter().find(|r| r.id == id) {
        Some(record) if record.manager != owner => Err(AppError::Forbidden),
        _ => Ok(()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Listing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: usize,
    pub per_page: Option<usize>,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub paid: usize,
    pub unpaid: usize,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    #[serde(flatten)]
    pub page: Paged<UserRecord>,
    pub stats: RosterStats,
    pub selected_count: usize,
    pub demo: bool,
}

fn stats_for(rows: &[UserRecord]) -> RosterStats {
    let paid = rows
        .iter()
        .filter(|r| r.status == BillingStatus::Paid)
        .count();
    RosterStats {
        total: rows.len(),
        paid,
        unpaid: rows.len() - paid,
    }
}

/// GET /api/v1/admin/users?search=&page=&per_page=
///
/// Managers see only their own leads and their stats are scoped the same
/// way; admins see everyone with stats over the full roster regardless of
/// the search term.
pub async fn handle_list_users(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Query(query): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, AppError> {
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE);
    if !ALLOWED_PAGE_SIZES.contains(&per_page) {
        return Err(AppError::Validation(
            "per_page must be one of 5, 10, 20, 50".to_string(),
        ));
    }

    ensure_loaded(&state).await;
    let all = state.roster.snapshot();

    let scoped: Vec<UserRecord> = match manager_scope(&session) {
        Some(owner) => all.iter().filter(|r| r.manager == owner).cloned().collect(),
        None => all.clone(),
    };

    let visible: Vec<UserRecord> = scoped
        .iter()
        .filter(|r| r.matches_search(&query.search))
        .cloned()
        .collect();

    let stats = match session.role {
        Role::Manager => stats_for(&visible),
        _ => stats_for(&all),
    };

    // Drop selection entries for records that no longer exist. The save is
    // skipped when nothing was removed so a plain list fetch cannot clobber
    // a selection toggle racing it.
    let mut record = session.record.clone();
    if record.selection.prune(&state.roster.ids()) {
        state.sessions.save(&session.token, &record).await?;
    }

    let page = listing::paginate(&visible, query.page, per_page);
    Ok(Json(RosterResponse {
        page,
        stats,
        selected_count: record.selection.count(),
        demo: state.roster.is_demo(),
    }))
}

#[derive(Debug, Serialize)]
pub struct OwnersResponse {
    pub owners: Vec<&'static str>,
}

/// GET /api/v1/admin/owners
pub async fn handle_list_owners(
    RequireStaff(_session): RequireStaff,
) -> Json<OwnersResponse> {
    Json(OwnersResponse {
        owners: OWNERS.to_vec(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleAllRequest {
    #[serde(default)]
    pub visible_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected_count: usize,
}

/// POST /api/v1/admin/selection/toggle
pub async fn handle_selection_toggle(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    if request.id.trim().is_empty() {
        return Err(AppError::Validation("id is required".to_string()));
    }

    let mut record = session.record.clone();
    record.selection.toggle(&request.id);
    state.sessions.save(&session.token, &record).await?;

    Ok(Json(SelectionResponse {
        selected_count: record.selection.count(),
    }))
}

/// POST /api/v1/admin/selection/toggle-all
pub async fn handle_selection_toggle_all(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Json(request): Json<ToggleAllRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let mut record = session.record.clone();
    record.selection.toggle_all(&request.visible_ids);
    state.sessions.save(&session.token, &record).await?;

    Ok(Json(SelectionResponse {
        selected_count: record.selection.count(),
    }))
}

/// POST /api/v1/admin/selection/clear
pub async fn handle_selection_clear(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
) -> Result<Json<SelectionResponse>, AppError> {
    let mut record = session.record.clone();
    record.selection.clear();
    state.sessions.save(&session.token, &record).await?;

    Ok(Json(SelectionResponse { selected_count: 0 }))
}

// ────────────────────────────────────────────────────────────────────────────
// Mutations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub id: String,
    #[serde(flatten)]
    pub outcome: CommitOutcome,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
    pub manager: Option<String>,
    pub status: Option<BillingStatus>,
}

/// POST /api/v1/admin/users
///
/// Admins pick the role and owner; the manager path forces `role = user`
/// and forces the owner to the manager's own name, overriding any submitted
/// values. The welcome/set-password email is best-effort.
pub async fn handle_create_user(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }
    if !is_valid_email(&request.email) || request.email.len() > 255 {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let (role, owner) = match manager_scope(&session) {
        Some(own_name) => ("user".to_string(), own_name),
        None => {
            let role = request.role.unwrap_or_else(|| "user".to_string());
            if !["admin", "manager", "user"].contains(&role.as_str()) {
                return Err(AppError::Validation(
                    "role must be one of admin, manager, user".to_string(),
                ));
            }
            let owner = request
                .manager
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNASSIGNED_OWNER.to_string());
            (role, owner)
        }
    };
    let status = request.status.unwrap_or(BillingStatus::Unpaid);

    ensure_loaded(&state).await;
    let id = Uuid::new_v4();
    let record = UserRecord {
        id: id.to_string(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        role,
        manager: owner,
        status,
        created_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        last_login: None,
    };

    if state.roster.is_demo() {
        state.roster.commit(record.clone());
        info!("Created demo-mode user {}", record.name);
        return Ok(Json(MutationResponse {
            id: record.id,
            outcome: CommitOutcome::Committed { durable: false },
        }));
    }

    if let Err(e) = repo::insert(
        &state.db,
        id,
        &record.name,
        &record.email,
        &record.role,
        &record.manager,
        record.status.as_str(),
    )
    .await
    {
        error!("User creation failed: {e}");
        return Ok(Json(MutationResponse {
            id: record.id,
            outcome: CommitOutcome::Rejected {
                reason: "Failed to create user. Please try again.".to_string(),
            },
        }));
    }

    // Welcome email so the user can set a password. Its failure never fails
    // the creation.
    if let Err(e) = state.auth.recover(&record.email).await {
        warn!("Welcome email for {} failed: {e}", record.email);
    }

    state.roster.commit(record.clone());
    state.roster.publish(RosterEvent::created());
    info!("Created user {}", record.name);

    Ok(Json(MutationResponse {
        id: record.id,
        outcome: CommitOutcome::Committed { durable: true },
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BillingStatus,
}

/// PATCH /api/v1/admin/users/:id/status
///
/// Managers can only edit records they own; the admin view is unscoped.
pub async fn handle_update_status(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    ensure_loaded(&state).await;
    ensure_in_scope(&state.roster, &id, manager_scope(&session).as_deref())?;

    let outcome = commit_record_edit(&state, &id, |record| {
        record.status = request.status;
    })
    .await?;

    Ok(Json(MutationResponse { id, outcome }))
}

#[derive(Debug, Deserialize)]
pub struct OwnerUpdateRequest {
    #[serde(default)]
    pub owner: String,
}

/// PATCH /api/v1/admin/users/:id/owner — admin only.
pub async fn handle_update_owner(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
    Path(id): Path<String>,
    Json(request): Json<OwnerUpdateRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let owner = request.owner.trim().to_string();
    if owner.is_empty() {
        return Err(AppError::Validation("owner is required".to_string()));
    }

    ensure_loaded(&state).await;

    let outcome = if state.roster.is_demo() {
        match state.roster.apply(&id, |r| r.manager = owner.clone()) {
            Some(_) => CommitOutcome::Committed { durable: false },
            None => return Err(AppError::NotFound("User not found".to_string())),
        }
    } else {
        let uuid = parse_record_id(&id)?;
        match repo::update_owner(&state.db, uuid, &owner).await {
            Err(e) => {
                error!("Owner update for {id} failed: {e}");
                CommitOutcome::Rejected {
                    reason: "Failed to update owner. Please try again.".to_string(),
                }
            }
            Ok(0) => return Err(AppError::NotFound("User not found".to_string())),
            Ok(_) => {
                state.roster.apply(&id, |r| r.manager = owner.clone());
                state.roster.publish(RosterEvent::updated());
                CommitOutcome::Committed { durable: true }
            }
        }
    };

    Ok(Json(MutationResponse { id, outcome }))
}

/// Shared status-edit commit path: demo commits are local, real commits hit
/// the store first and only then touch the roster.
async fn commit_record_edit<F>(
    state: &AppState,
    id: &str,
    mutate: F,
) -> Result<CommitOutcome, AppError>
where
    F: Fn(&mut UserRecord) + Copy,
{
    if state.roster.is_demo() {
        return match state.roster.apply(id, mutate) {
            Some(_) => Ok(CommitOutcome::Committed { durable: false }),
            None => Err(AppError::NotFound("User not found".to_string())),
        };
    }

    let uuid = parse_record_id(id)?;
    // The mutation is applied to a scratch copy to learn the new status
    // string for the store, then committed to the roster after confirmation.
    let mut scratch = match state.roster.snapshot().into_iter().find(|r| r.id == id) {
        Some(record) => record,
        None => return Err(AppError::NotFound("User not found".to_string())),
    };
    mutate(&mut scratch);

    match repo::update_status(&state.db, uuid, scratch.status.as_str()).await {
        Err(e) => {
            error!("Status update for {id} failed: {e}");
            Ok(CommitOutcome::Rejected {
                reason: "Failed to update billing status. Please try again.".to_string(),
            })
        }
        Ok(0) => Err(AppError::NotFound("User not found".to_string())),
        Ok(_) => {
            state.roster.apply(id, mutate);
            state.roster.publish(RosterEvent::updated());
            Ok(CommitOutcome::Committed { durable: true })
        }
    }
}

fn parse_record_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("User not found".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Bulk lead assignment
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignLeadsRequest {
    #[serde(default)]
    pub owner: String,
}

#[derive(Debug, Serialize)]
pub struct AssignLeadsResponse {
    pub assigned: usize,
    pub owner: String,
    #[serde(flatten)]
    pub outcome: CommitOutcome,
}

/// POST /api/v1/admin/leads/assign — admin only.
///
/// Updates every selected record's owner and clears the selection as one
/// atomic transition: the response never reflects a half-assigned state.
pub async fn handle_assign_leads(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(request): Json<AssignLeadsRequest>,
) -> Result<Json<AssignLeadsResponse>, AppError> {
    let owner = request.owner.trim().to_string();
    if owner.is_empty() {
        return Err(AppError::Validation(
            "Please select an owner to assign the leads to.".to_string(),
        ));
    }

    ensure_loaded(&state).await;

    // Selected ids, minus any record deleted since the selection was made.
    let mut record = session.record.clone();
    record.selection.prune(&state.roster.ids());
    let selected = record.selection.selected_ids();
    if selected.is_empty() {
        return Err(AppError::Validation(
            "Please select at least one user to share with leads.".to_string(),
        ));
    }

    let (assigned, outcome) = if state.roster.is_demo() {
        for id in &selected {
            state.roster.apply(id, |r| r.manager = owner.clone());
        }
        (selected.len(), CommitOutcome::Committed { durable: false })
    } else {
        let uuids = parse_uuid_ids(&selected);

        match repo::assign_owner_bulk(&state.db, &uuids, &owner).await {
            Err(e) => {
                error!("Bulk lead assignment failed: {e}");
                // Roster and selection are left untouched on rejection.
                return Ok(Json(AssignLeadsResponse {
                    assigned: 0,
                    owner,
                    outcome: CommitOutcome::Rejected {
                        reason: "Failed to assign leads. Please try again.".to_string(),
                    },
                }));
            }
            Ok(rows) => {
                for id in &selected {
                    state.roster.apply(id, |r| r.manager = owner.clone());
                }
                state.roster.publish(RosterEvent::updated());
                // The store decides how many rows the assignment reached;
                // a record deleted mid-flight is not counted.
                (rows as usize, CommitOutcome::Committed { durable: true })
            }
        }
    };

    record.selection.clear();
    state.sessions.save(&session.token, &record).await?;
    info!("Assigned {assigned} leads to {owner}");

    Ok(Json(AssignLeadsResponse {
        assigned,
        owner,
        outcome,
    }))
}

/// Roster ids are uuids outside demo mode; anything else cannot exist in
/// the store and is dropped before the bulk update.
fn parse_uuid_ids(ids: &[String]) -> Vec<Uuid> {
    ids.iter().filter_map(|id| Uuid::parse_str(id).ok()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Change-feed stream
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/events
///
/// SSE stream of roster change notifications for toast display. A slow
/// consumer that lags the buffer just misses the skipped events; the list
/// endpoint always reflects the current roster regardless.
pub async fn handle_events(
    State(state): State<AppState>,
    RequireStaff(_session): RequireStaff,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.roster.subscribe();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let data = serde_json::to_string(&event).unwrap_or_default();
                    yield Ok(Event::default().event(event.kind).data(data));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE subscriber lagged, skipped {skipped} roster events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::demo::demo_users;
    use crate::accounts::roster::Roster;
    use crate::selection::SelectionSet;

    #[test]
    fn stats_split_by_billing_status() {
        let stats = stats_for(&demo_users());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.paid, 2);
        assert_eq!(stats.unpaid, 3);
    }

    #[test]
    fn search_narrows_the_demo_roster() {
        let visible: Vec<UserRecord> = demo_users()
            .into_iter()
            .filter(|r| r.matches_search("sarah"))
            .collect();
        // Two demo users are owned by Sarah Johnson.
        assert_eq!(visible.len(), 2);
    }

    // The bulk-assign flow over the demo roster: exactly the selected
    // records change owner and the selection ends up empty.
    #[test]
    fn bulk_assign_updates_only_selected_records() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(demo_users(), mark, true);

        let mut selection = SelectionSet::default();
        selection.toggle("demo-2");
        selection.toggle("demo-5");
        selection.prune(&roster.ids());

        let selected = selection.selected_ids();
        assert_eq!(selected.len(), 2);

        for id in &selected {
            roster.apply(id, |r| r.manager = "Jennifer Lee".to_string());
        }
        selection.clear();

        let mut assigned: Vec<String> = roster
            .snapshot()
            .into_iter()
            .filter(|r| r.manager == "Jennifer Lee")
            .map(|r| r.id)
            .collect();
        assigned.sort();
        assert_eq!(assigned, vec!["demo-2".to_string(), "demo-5".to_string()]);
        assert!(selection.is_empty());
    }

    // Scope check for the status edit: a manager can reach their own lead
    // but not a record owned by someone else; admins (no scope) pass.
    #[test]
    fn manager_cannot_touch_another_owners_lead() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(demo_users(), mark, true);

        // demo-1 belongs to Sarah Johnson, demo-4 to Robert Wilson.
        assert!(ensure_in_scope(&roster, "demo-1", Some("Sarah Johnson")).is_ok());
        assert!(matches!(
            ensure_in_scope(&roster, "demo-4", Some("Sarah Johnson")),
            Err(AppError::Forbidden)
        ));

        // No scope means admin: everything is reachable.
        assert!(ensure_in_scope(&roster, "demo-4", None).is_ok());
        // Unknown ids are left for the mutation path to 404.
        assert!(ensure_in_scope(&roster, "vanished", Some("Sarah Johnson")).is_ok());
    }

    #[test]
    fn non_uuid_ids_are_dropped_before_the_bulk_update() {
        let ids = vec![Uuid::nil().to_string(), "demo-2".to_string()];
        assert_eq!(parse_uuid_ids(&ids), vec![Uuid::nil()]);
    }

    #[test]
    fn selection_of_a_deleted_record_is_pruned_before_assignment() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(demo_users(), mark, true);

        let mut selection = SelectionSet::default();
        selection.toggle("demo-1");
        selection.toggle("vanished");
        selection.prune(&roster.ids());

        assert_eq!(selection.selected_ids(), vec!["demo-1".to_string()]);
    }

    #[test]
    fn page_size_allow_list_holds_the_default() {
        assert!(ALLOWED_PAGE_SIZES.contains(&DEFAULT_PAGE_SIZE));
    }
}
