//! The embedded JavaScript tracking snippet.
//!
//! A pure string-substitution template with two slots: the analytics host
//! origin and the project's tracking identifier. The snippet loads the
//! pixel with the page URL, referrer, title, and window dimensions encoded
//! in the query string.

const TEMPLATE: &str = "(function(){var w=window,d=document,\
i=new Image,e=encodeURIComponent;i.src='{origin}/a.gif?tid={tid}&url='\
+e(d.location.href)+'&ref='+e(d.referrer)+'&t='+e(d.title)+'&wiw='\
+e(w.innerWidth)+'&wih='+e(w.innerHeight);})()";

/// Substitute the analytics origin and tracking identifier into the snippet.
pub fn render(origin: &str, tid: &str) -> String {
  TEMPLATE.replace("{origin}", origin).replace("{tid}", tid)
}
