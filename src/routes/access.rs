use diesel::result::QueryResult;
use diesel::sqlite::SqliteConnection;
use flash::Flash;
use iron::headers::Location;
use iron::modifiers::Header;
use iron::prelude::*;
use iron::status;
use policy::{self, Decision};
use urlencoded::{QueryMap, UrlEncodedBody};
use super::{connection, fail, secret};

type Check = fn(&SqliteConnection, Option<&QueryMap>) -> QueryResult<Option<Decision>>;

/// A form field. `form` is `None` when the body isn't a form at all.
fn field(form: Option<&QueryMap>, name: &str) -> Option<String> {
    form.and_then(|form| form.get(name))
        .and_then(|values| values.first())
        .cloned()
}

/// A missing name is read as the empty string, which never names anyone.
fn name(form: Option<&QueryMap>) -> String {
    field(form, "name").unwrap_or_default()
}

fn check_indirection(
    conn: &SqliteConnection,
    form: Option<&QueryMap>
) -> QueryResult<Option<Decision>> {
    policy::indirection(conn, &name(form)).map(Some)
}

fn check_delegation(
    conn: &SqliteConnection,
    form: Option<&QueryMap>
) -> QueryResult<Option<Decision>> {
    let role = field(form, "role");
    policy::delegation(conn, &name(form), role.as_ref().map(|r| r.as_str()))
}

fn check_intersection(
    conn: &SqliteConnection,
    form: Option<&QueryMap>
) -> QueryResult<Option<Decision>> {
    policy::intersection(conn, &name(form)).map(Some)
}

fn check_inference(
    conn: &SqliteConnection,
    form: Option<&QueryMap>
) -> QueryResult<Option<Decision>> {
    policy::inference(conn, &name(form)).map(Some)
}

/// Adds the decision, if there is one, to the client's queue.
fn queue(flash: &mut Flash, decision: Option<Decision>) {
    match decision {
        Some(decision) => {
            if decision.granted() {
                info!("{}", decision);
            } else {
                warn!("{}", decision);
            }
            flash.push(decision.message());
        },
        None => debug!("No decision reached.")
    }
}

/// Sends the client back to the roster with its queue attached.
fn redirect(flash: &Flash, key: [u8; 32]) -> Response {
    let location = Header(Location("/index".to_owned()));
    let mut res = Response::with((status::Found, location));
    flash.store(&mut res, key);
    res
}

fn handle(req: &mut Request, what: &'static str, check: Check) -> IronResult<Response> {
    let key = secret(req)?;
    let conn = connection(req)?;

    let decision = {
        let form = req.get_ref::<UrlEncodedBody>().ok();
        check(&*conn, form).map_err(|e| fail(what, e))?
    };

    let mut flash = Flash::from_request(req, key);
    queue(&mut flash, decision);
    Ok(redirect(&flash, key))
}

/// POST /indirection
/// Body:
///     name: The person asking for access.
/// Response:
///     Redirects to /index with the decision flashed.
pub fn indirection(req: &mut Request) -> IronResult<Response> {
    handle(req, "Indirection check failed", check_indirection)
}

/// POST /delegation
/// Body:
///     name: The person asking for access.
///     role: The role they claim to have.
/// Response:
///     Redirects to /index. A CS member whose role doesn't match gets no
///     message; a missing role is denied.
pub fn delegation(req: &mut Request) -> IronResult<Response> {
    handle(req, "Delegation check failed", check_delegation)
}

/// POST /intersection
/// Body:
///     name: The person asking for access.
pub fn intersection(req: &mut Request) -> IronResult<Response> {
    handle(req, "Intersection check failed", check_intersection)
}

/// POST /inference
/// Body:
///     name: The person asking for access.
pub fn inference(req: &mut Request) -> IronResult<Response> {
    handle(req, "Inference check failed", check_inference)
}

#[cfg(test)]
mod tests {
    use database::tests::memory;
    use iron::headers::SetCookie;
    use loader::{self, Roster};
    use sodiumoxide;
    use super::*;

    const KEY: [u8; 32] = [3; 32];

    fn alice() -> SqliteConnection {
        let conn = memory();
        let roster = Roster::from_reader(r#"{"Pitt": [
            {"name": "Alice", "role": "graduate", "permission": "write", "department": "CS"}
        ]}"#.as_bytes()).unwrap();
        loader::load(&conn, &roster).unwrap();
        conn
    }

    fn form(pairs: &[(&str, &str)]) -> QueryMap {
        pairs.iter()
            .map(|&(k, v)| (k.to_owned(), vec![v.to_owned()]))
            .collect()
    }

    /// Runs a check and returns the messages the client would carry back.
    fn flashed(check: Check, form: Option<&QueryMap>) -> (Response, Vec<String>) {
        let _ = sodiumoxide::init();
        let conn = alice();

        let mut flash = Flash::default();
        queue(&mut flash, check(&conn, form).unwrap());
        let res = redirect(&flash, KEY);

        let messages = {
            let &SetCookie(ref cookies) = res.headers.get::<SetCookie>().unwrap();
            let value = cookies[0]
                .trim_start_matches("flash=")
                .split(';')
                .next()
                .unwrap();
            Flash::unseal(value, KEY).map(|f| f.messages).unwrap_or_default()
        };

        (res, messages)
    }

    #[test]
    fn redirects_to_the_roster() {
        let form = form(&[("name", "Alice")]);
        let (res, messages) = flashed(check_indirection, Some(&form));

        assert_eq!(res.status, Some(status::Found));
        assert_eq!(
            res.headers.get::<Location>(),
            Some(&Location("/index".to_owned()))
        );
        assert_eq!(messages, vec!["Alice is a Graduate student: Access Granted"]);
    }

    #[test]
    fn denials_are_flashed_too() {
        let form = form(&[("name", "Alice")]);
        let (_, messages) = flashed(check_inference, Some(&form));

        assert_eq!(
            messages,
            vec!["Unable to infer role based on permission status: Access Denied"]
        );
    }

    #[test]
    fn role_mismatch_queues_nothing() {
        let form = form(&[("name", "Alice"), ("role", "undergrad")]);
        let (res, messages) = flashed(check_delegation, Some(&form));

        assert_eq!(res.status, Some(status::Found));
        assert!(messages.is_empty());

        let &SetCookie(ref cookies) = res.headers.get::<SetCookie>().unwrap();
        assert_eq!(cookies[0], "flash=; Path=/; Max-Age=0");
    }

    #[test]
    fn missing_role_is_denied() {
        let form = form(&[("name", "Alice")]);
        let (_, messages) = flashed(check_delegation, Some(&form));

        assert_eq!(
            messages,
            vec!["CS department does not confirm that Alice is a : Access Denied"]
        );
    }

    #[test]
    fn missing_name_is_denied() {
        let form = form(&[("role", "graduate")]);
        let (_, messages) = flashed(check_intersection, Some(&form));

        assert_eq!(
            messages,
            vec![" is not in CS nor is a graduate student: Access Denied"]
        );
    }

    #[test]
    fn non_form_bodies_are_denied() {
        let (res, messages) = flashed(check_indirection, None);

        assert_eq!(res.status, Some(status::Found));
        assert_eq!(messages, vec![" is not a Graduate student: Access Denied"]);
    }

    #[test]
    fn queue_keeps_earlier_messages() {
        let mut flash = Flash::default();
        flash.push("first");

        queue(&mut flash, Some(Decision::Denied("second".to_owned())));
        queue(&mut flash, None);

        assert_eq!(flash.messages, vec!["first", "second"]);
    }
}
