//! Blog-post fixtures
//!
//! Ten blog posts whose authors alternate between two names, five named
//! collections, and a partial registry with the three partials the suites
//! render: `_partial`, `_blog_post` and `_collection`.

use serde::Serialize;
use serde_json::Value;

use crate::cache::Cacheable;
use crate::templating::PartialRegistry;

const BLOG_AUTHORS: [&str; 2] = ["David Heinemeier Hansson", "Pavel Pravosud"];

/// A blog post as a partial sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogPost {
    pub id: u32,
    pub body: String,
    pub author_name: String,
}

impl Cacheable for BlogPost {
    fn cache_key(&self) -> String {
        format!("blog_posts/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: u32,
    pub name: String,
}

/// Posts 1 to 10, authors cycling from David Heinemeier Hansson.
pub fn blog_post_collection() -> Vec<BlogPost> {
    (1..=10)
        .zip(BLOG_AUTHORS.iter().cycle())
        .map(|(id, author)| BlogPost {
            id,
            body: format!("post body {id}"),
            author_name: (*author).to_string(),
        })
        .collect()
}

/// Collections 1 to 5.
pub fn collection_collection() -> Vec<Collection> {
    (1..=5)
        .map(|id| Collection {
            id,
            name: format!("collection {id}"),
        })
        .collect()
}

/// Registry holding `_partial`, `_blog_post` and `_collection`.
///
/// `_blog_post` splits the author name at the first space into
/// `author.first_name` and `author.last_name`.
pub fn fixture_partials() -> PartialRegistry {
    PartialRegistry::new()
        .with("_partial", |json, _| json.object(|json| json.set("content", "hello")))
        .with("_blog_post", |json, locals| {
            let blog_post = locals.require("blog_post")?;
            json.object(|json| {
                json.extract(blog_post, &["id", "body"])?;
                let author = blog_post.get("author_name").and_then(Value::as_str).unwrap_or("");
                let mut name = author.splitn(2, ' ');
                let (first, last) = (name.next(), name.next());
                json.push_child_object("author", |json| {
                    json.object(|json| {
                        json.set("first_name", first)?;
                        json.set("last_name", last)
                    })
                })
            })
        })
        .with("_collection", |json, locals| {
            let collection = locals.require("collection")?;
            json.object(|json| json.extract(collection, &["id", "name"]))
        })
}

/// Assert that `json` (or its `context` attribute) is the rendered blog-post
/// collection.
///
/// # Panics
///
/// When the document does not match.
pub fn assert_collection_rendered(json: &str, context: Option<&str>) {
    let parsed: Value = serde_json::from_str(json).expect("rendered document is JSON");
    let result = match context {
        Some(key) => &parsed[key],
        None => &parsed,
    };

    let posts = result.as_array().expect("collection renders an array");
    assert_eq!(posts.len(), 10);
    assert_eq!(posts[4]["body"], "post body 5");
    assert_eq!(posts[2]["author"]["last_name"], "Heinemeier Hansson");
    assert_eq!(posts[5]["author"]["first_name"], "Pavel");
}
