//! Route table of the demo application.

use crate::directory::UserDirectory;
use crate::{layout, pages};
use std::time::Duration;
use tenvis_waypoint_core::{Route, Router, RouterError};

/// Options that shape the route table.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Delay before Home rewrites the query parameters.
    pub search_update_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            search_update_delay: Duration::from_secs(3),
        }
    }
}

/// Build the application's router.
///
/// ```text
/// /                       root       (NotFound boundary)
/// ├── ""                  home       (ErrorComponent boundary)
/// ├── About               about
/// └── /users/:userId      user       (NotFound boundary)
///     └── followers       followers
/// ```
///
/// # Errors
///
/// Returns an error if the route table is invalid.
pub fn build_router(directory: UserDirectory, options: &AppOptions) -> Result<Router, RouterError> {
    Router::new(vec![Route::new("/")
        .id("root")
        .element(layout::root)
        .error_element(pages::not_found)
        .children(vec![
            Route::new("")
                .id("home")
                .element(pages::home(directory.clone()))
                .error_element(pages::error_component)
                .on_mount(pages::schedule_search_update(options.search_update_delay)),
            Route::new("About").id("about").element(pages::about),
            Route::new("/users/:userId")
                .id("user")
                .element(pages::user(directory))
                .error_element(pages::not_found)
                .child(Route::new("followers").id("followers").element(pages::followers)),
        ])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserRecord;
    use std::sync::Arc;
    use tenvis_waypoint_core::{Browser, Commands, NavigateOptions, Navigator};

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![UserRecord::new(1, "Ada"), UserRecord::new(2, "Grace")]).unwrap()
    }

    fn session(initial: &str) -> (Browser, Commands) {
        let router = build_router(directory(), &AppOptions::default()).unwrap();
        let (navigator, commands) = Navigator::channel();
        let browser = Browser::new(Arc::new(router), navigator, initial).unwrap();
        (browser, commands)
    }

    fn text(browser: &Browser) -> String {
        browser.view().text_content()
    }

    #[tokio::test]
    async fn test_static_paths_render_their_page() {
        let (browser, _commands) = session("/");
        let home = text(&browser);
        assert!(home.contains("Users"));
        assert!(home.contains("Ada"));
        assert!(home.contains("Grace"));
        assert!(!home.contains("A small demonstration"));
        assert_eq!(browser.state().resolution.leaf_id().unwrap().as_str(), "home");

        let (browser, _commands) = session("/About");
        let about = text(&browser);
        assert!(about.contains("A small demonstration"));
        assert!(!about.contains("Users"));
        assert_eq!(browser.state().resolution.leaf_id().unwrap().as_str(), "about");
    }

    #[tokio::test]
    async fn test_home_links_to_users() {
        let (browser, _commands) = session("/");
        let view = browser.view();
        let links = view.links();
        assert!(links.contains(&("Ada", "/users/1")));
        assert!(links.contains(&("Grace", "/users/2")));
    }

    #[tokio::test]
    async fn test_user_page() {
        let (browser, _commands) = session("/users/2");
        let content = text(&browser);
        assert!(content.contains("User with 2 is named Grace"));
        assert!(content.contains("Home"));
        assert!(browser.state().handled.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_user_ids_render_not_found() {
        for path in [
            "/users/5", "/users/0", "/users/-1", "/users/abc", "/users/+1", "/users/01", "/users/%201",
        ] {
            let (browser, _commands) = session(path);
            let state = browser.state();
            let content = state.view.text_content();
            assert!(content.contains("Not Found"), "{path}: {content}");
            assert!(!content.contains("is named"), "{path}");
            // The header stays: the user route's own boundary handled it.
            assert!(content.contains("Home"), "{path}");
            assert_eq!(state.handled.len(), 1);
            assert_eq!(state.handled[0].route_id.as_str(), "user");
            assert_eq!(state.handled[0].kind, "not_found");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_renders_root_not_found() {
        let (browser, _commands) = session("/nowhere");
        let state = browser.state();
        assert!(state.is_not_found());
        let content = state.view.text_content();
        assert!(content.contains("Not Found"));
        assert!(!content.contains("Home"));
        assert_eq!(state.handled[0].route_id.as_str(), "root");
        assert!(browser.mounted_routes().is_empty());
    }

    #[tokio::test]
    async fn test_followers_via_in_app_navigation() {
        let (mut browser, _commands) = session("/users/2");
        browser.click("Followers").unwrap();
        assert_eq!(browser.location().pathname(), "/users/2/followers");
        let content = text(&browser);
        assert!(content.contains("User with 2 is named Grace"));
        assert!(content.contains("Grace's Followers"));
    }

    #[tokio::test]
    async fn test_followers_of_first_user() {
        let (browser, _commands) = session("/users/1/followers");
        assert!(text(&browser).contains("Ada's Followers"));
    }

    #[tokio::test]
    async fn test_followers_without_context_is_handled() {
        let router = Router::new(vec![Route::new("/")
            .element(crate::layout::root)
            .error_element(pages::not_found)
            .child(Route::new("followers").element(pages::followers))])
        .unwrap();
        let location = waypoint_location::Location::parse("/followers").unwrap();
        let rendered = router.render(&location, &router.resolve(&location));
        assert!(rendered
            .view
            .text_content()
            .contains("Followers can only be shown from a user's page."));
        assert!(rendered.handled.is_empty());
    }

    #[tokio::test]
    async fn test_header_about_button() {
        let (mut browser, _commands) = session("/users/1");
        browser.click("About").unwrap();
        assert_eq!(browser.location().pathname(), "/about");
        assert!(text(&browser).contains("A small demonstration"));

        browser.click("Home").unwrap();
        assert_eq!(browser.location().pathname(), "/");
        assert_eq!(browser.history().len(), 3);
    }

    #[tokio::test]
    async fn test_renavigating_is_noop() {
        let (mut browser, _commands) = session("/users/2");
        let before = browser.state();
        let outcome = browser.navigate("/users/2", NavigateOptions::default()).unwrap();
        assert!(!outcome.is_navigated());
        assert_eq!(browser.history().len(), 1);
        assert!(Arc::ptr_eq(&before, &browser.state()));
    }

    #[tokio::test]
    async fn test_home_boundary_catches_failures() {
        let router = Router::new(vec![Route::new("/")
            .element(crate::layout::root)
            .error_element(pages::not_found)
            .child(
                Route::new("")
                    .element(|_| Err(tenvis_waypoint_core::RenderError::component("boom")))
                    .error_element(pages::error_component),
            )])
        .unwrap();
        let location = waypoint_location::Location::parse("/").unwrap();
        let rendered = router.render(&location, &router.resolve(&location));
        let content = rendered.view.text_content();
        assert!(content.contains("Something went wrong"));
        assert!(content.contains("boom"));
        assert!(content.contains("Home"));
        assert_eq!(rendered.handled[0].kind, "component");
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_search_update_fires_once() {
        let (mut browser, mut commands) = session("/");

        let command = commands.next().await.unwrap();
        browser.apply(command).unwrap();
        assert_eq!(browser.location().href(), "/?day=today&tomorrow=123");
        assert_eq!(browser.state().search_params().get("tomorrow"), Some("123"));
        assert!(text(&browser).contains("Users"));

        let again = tokio::time::timeout(Duration::from_secs(30), commands.next()).await;
        assert!(again.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_home_cancels_search_update() {
        let (mut browser, mut commands) = session("/");
        tokio::time::sleep(Duration::from_secs(1)).await;
        browser.click("Ada").unwrap();

        let fired = tokio::time::timeout(Duration::from_secs(30), commands.next()).await;
        assert!(fired.is_err());
        assert_eq!(browser.location().href(), "/users/1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_search_update_dropped_after_leaving_home() {
        let (mut browser, mut commands) = session("/");
        // The update is queued but not yet applied when the user moves on.
        tokio::time::sleep(Duration::from_secs(4)).await;
        browser.click("Ada").unwrap();

        while let Some(command) = commands.try_next() {
            browser.apply(command).unwrap();
        }
        assert_eq!(browser.location().href(), "/users/1");
        assert!(text(&browser).contains("User with 1 is named Ada"));
    }
}
