use utoipa::OpenApi;
use crate::{error, handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::bootstrap,
        handlers::create_user,
        handlers::get_full_state,
        handlers::get_config,
        handlers::get_all_lights,
        handlers::get_light,
        handlers::rename_light,
        handlers::set_light_state,
        handlers::get_all_groups,
        handlers::get_group,
        handlers::get_all_schedules,
        handlers::get_schedule,
    ),
    components(
        schemas(
            models::BridgeState,
            models::Light,
            models::LightState,
            models::Alert,
            models::Effect,
            models::ColorMode,
            models::BridgeConfig,
            models::WhitelistEntry,
            models::CreateUserRequest,
            models::CreateUserResponse,
            models::RenameLightRequest,
            error::ErrorBody,
            error::ErrorDetail,
        )
    ),
    tags(
        (name = "bootstrap", description = "Reset the bridge to its seed state"),
        (name = "config", description = "Users and bridge configuration"),
        (name = "lights", description = "Light attributes and state"),
        (name = "groups", description = "Read-only groups"),
        (name = "schedules", description = "Read-only schedules"),
    )
)]
pub struct ApiDoc;
