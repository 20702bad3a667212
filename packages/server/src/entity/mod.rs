pub mod blog_post;
