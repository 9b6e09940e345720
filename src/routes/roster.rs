use flash::Flash;
use iron::headers::ContentType;
use iron::modifiers::Header;
use iron::prelude::*;
use iron::status;
use people::{self, Person, RosterLine};
use std::fmt::Write;
use super::{connection, fail, secret};

/// GET / and GET /index
/// Response:
///     The roster, preceded by any flashed messages, which are then cleared.
pub fn index(req: &mut Request) -> IronResult<Response> {
    let key = secret(req)?;
    let conn = connection(req)?;

    let roster = people::all(&conn)
        .map_err(|e| fail("Could not load the roster", e))?;
    let flash = Flash::from_request(req, key);

    let body = render(&flash.messages, &roster);
    let mut res = Response::with((status::Ok, Header(ContentType::html()), body));
    Flash::default().store(&mut res, key);
    Ok(res)
}

fn render(messages: &[String], roster: &[Person]) -> String {
    let mut flashes = String::new();
    for msg in messages {
        // String writes should succeed.
        write!(&mut flashes, "<li>{}</li>", escape(msg)).unwrap();
    }

    let mut lines = String::new();
    for person in roster {
        let line = RosterLine(person).to_string();
        write!(&mut lines, "<li>{}</li>", escape(&line)).unwrap();
    }

    format!(
        include_str!("index.html"),
        flashes = flashes,
        people = lines
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c)
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_messages_before_people() {
        let bob = Person {
            id: 1,
            name: "Bob".to_owned(),
            role: "undergrad".to_owned(),
            permission: "read".to_owned(),
            department: "Math".to_owned()
        };
        let msgs = vec!["<Mallory> is not a Graduate student: Access Denied".to_owned()];

        let page = render(&msgs, &[bob]);

        let flash = page.find("&lt;Mallory&gt; is not a Graduate student").unwrap();
        let person = page.find("<li>Bob undergrad read Math</li>").unwrap();
        assert!(flash < person);
        assert!(!page.contains("<Mallory>"));
    }
}
