//! vim25 SOAP transport (`https://{host}/sdk`).
//!
//! The Automation REST API does not expose host graphics settings or host
//! service control, so those go through the classic vim25 web service.
//! This module builds envelopes, keeps the `vmware_soap_session` cookie,
//! turns responses into a small element tree and maps SOAP faults onto
//! [`VmwareError`] kinds.

use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use crate::types::{MoRef, VsphereConfig};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

// ─── Constants ───────────────────────────────────────────────────────

const NS_SOAPENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const NS_VIM25: &str = "urn:vim25";
const SOAP_ACTION: &str = "urn:vim25/6.5";

// ─── Element tree ────────────────────────────────────────────────────

/// A parsed XML element. Names are local (namespace prefixes stripped).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Attribute value by local name (`type`, `xsi:type` → `type`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Interpret `<x type="Kind">value</x>` as a managed-object reference.
    ///
    /// When an element carries both `type` and `xsi:type`, the last one wins
    /// in `attrs`; vim25 always writes the MoRef `type` first, so look for the
    /// first occurrence explicitly.
    pub fn moref(&self) -> Option<MoRef> {
        let kind = self
            .attrs
            .iter()
            .find(|(k, v)| k == "type" && v.as_str() != "ManagedObjectReference")?;
        if self.text.is_empty() {
            return None;
        }
        Some(MoRef::new(kind.1.clone(), self.text.clone()))
    }
}

/// Parse a whole XML document into an element tree rooted at a synthetic
/// `#document` node.
pub fn parse_document(xml: &str) -> VmwareResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = vec![XmlNode::named("#document")];

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(element_from_start(e)?),
            Event::Empty(ref e) => {
                let node = element_from_start(e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| VmwareError::parse(format!("Bad XML text: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(VmwareError::parse("Unbalanced XML document"));
    }
    stack
        .pop()
        .ok_or_else(|| VmwareError::parse("Empty XML document"))
}

fn element_from_start(e: &BytesStart) -> VmwareResult<XmlNode> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut node = XmlNode::named(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| VmwareError::parse(format!("Bad XML attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| VmwareError::parse(format!("Bad XML attribute value: {e}")))?;
        node.attrs.push((key, value.into_owned()));
    }
    Ok(node)
}

/// Extract the single element inside `Envelope/Body`, converting a SOAP
/// `Fault` into an error.
pub fn response_body(doc: &XmlNode) -> VmwareResult<XmlNode> {
    let body = doc
        .child("Envelope")
        .and_then(|env| env.child("Body"))
        .ok_or_else(|| VmwareError::parse("SOAP response has no Envelope/Body"))?;

    let first = body
        .children
        .first()
        .ok_or_else(|| VmwareError::parse("SOAP response body is empty"))?;

    if first.name == "Fault" {
        return Err(fault_to_error(first));
    }
    Ok(first.clone())
}

/// Map a `soapenv:Fault` element onto a [`VmwareError`].
pub fn fault_to_error(fault: &XmlNode) -> VmwareError {
    let detail = fault.child("detail").and_then(|d| d.children.first());

    // Detail element is named `<FaultName>Fault` and typed `xsi:type="FaultName"`.
    let fault_type = detail
        .map(|d| {
            d.attr("type")
                .map(str::to_string)
                .unwrap_or_else(|| d.name.trim_end_matches("Fault").to_string())
        })
        .unwrap_or_default();

    let mut message = fault.child_text("faultstring").unwrap_or_default().trim().to_string();
    if message.is_empty() {
        message = detail
            .and_then(|d| d.child("faultMessage"))
            .and_then(|m| m.child_text("message"))
            .unwrap_or("Unknown SOAP fault")
            .to_string();
    }

    let kind = match fault_type.as_str() {
        "HostConfigFault" => VmwareErrorKind::ConfigFault,
        "InvalidLogin" | "NotAuthenticated" => VmwareErrorKind::AuthenticationError,
        "ManagedObjectNotFound" => VmwareErrorKind::NotFound,
        "NoPermission" => VmwareErrorKind::AccessDenied,
        _ => VmwareErrorKind::SoapFault,
    };

    debug!(fault = %fault_type, %message, "SOAP fault");
    VmwareError::new(kind, message)
}

/// Escape text for inclusion in an XML element.
pub fn xml_escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// `<tag type="Kind">value</tag>`
pub fn moref_xml(tag: &str, moref: &MoRef) -> String {
    format!(
        r#"<{tag} type="{kind}">{value}</{tag}>"#,
        tag = tag,
        kind = xml_escape(&moref.kind),
        value = xml_escape(&moref.value),
    )
}

/// Wrap a method element in a SOAP 1.1 envelope.
pub fn envelope(method_xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="{NS_SOAPENV}" xmlns:xsd="{NS_XSD}" xmlns:xsi="{NS_XSI}">
  <soapenv:Body>{method_xml}</soapenv:Body>
</soapenv:Envelope>"#,
    )
}

/// `<Method xmlns="urn:vim25"><_this .../>args</Method>`
pub fn method_call(method: &str, this: &MoRef, args_xml: &str) -> String {
    format!(
        r#"<{method} xmlns="{NS_VIM25}">{this}{args_xml}</{method}>"#,
        this = moref_xml("_this", this),
    )
}

// ─── Property collector results ──────────────────────────────────────

/// One `ObjectContent` from a property collector result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContent {
    pub obj: MoRef,
    pub props: Vec<(String, XmlNode)>,
}

impl ObjectContent {
    /// The `val` element of a property, if it was returned.
    pub fn prop(&self, path: &str) -> Option<&XmlNode> {
        self.props.iter().find(|(n, _)| n == path).map(|(_, v)| v)
    }

    pub fn prop_text(&self, path: &str) -> Option<&str> {
        self.prop(path).map(|v| v.text.as_str())
    }
}

/// Parse a `RetrieveResult` (`returnval` of RetrievePropertiesEx /
/// ContinueRetrievePropertiesEx) into objects plus the paging token.
pub fn parse_retrieve_result(returnval: &XmlNode) -> (Vec<ObjectContent>, Option<String>) {
    let objects = returnval
        .children_named("objects")
        .filter_map(|o| {
            let obj = o.child("obj")?.moref()?;
            let props = o
                .children_named("propSet")
                .filter_map(|p| {
                    let name = p.child_text("name")?.to_string();
                    let val = p.child("val")?.clone();
                    Some((name, val))
                })
                .collect();
            Some(ObjectContent { obj, props })
        })
        .collect();
    let token = returnval
        .child_text("token")
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    (objects, token)
}

/// Morefs from an `ArrayOfManagedObjectReference` value.
pub fn moref_array(val: &XmlNode) -> Vec<MoRef> {
    val.children_named("ManagedObjectReference")
        .filter_map(XmlNode::moref)
        .collect()
}

fn path_set_xml(paths: &[&str]) -> String {
    paths
        .iter()
        .map(|p| format!("<pathSet>{}</pathSet>", xml_escape(p)))
        .collect()
}

// ─── Service content ─────────────────────────────────────────────────

/// The subset of `ServiceContent` this client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContent {
    pub root_folder: MoRef,
    pub property_collector: MoRef,
    pub view_manager: MoRef,
    pub session_manager: MoRef,
}

impl ServiceContent {
    fn from_returnval(rv: &XmlNode) -> VmwareResult<Self> {
        let get = |name: &str| {
            rv.child(name)
                .and_then(XmlNode::moref)
                .ok_or_else(|| VmwareError::parse(format!("ServiceContent is missing {name}")))
        };
        Ok(Self {
            root_folder: get("rootFolder")?,
            property_collector: get("propertyCollector")?,
            view_manager: get("viewManager")?,
            session_manager: get("sessionManager")?,
        })
    }
}

// ─── Client ──────────────────────────────────────────────────────────

/// vim25 SOAP client with a cookie-held session.
pub struct SoapClient {
    client: Client,
    endpoint: String,
    config: VsphereConfig,
    content: Option<ServiceContent>,
    request_counter: AtomicU64,
}

impl SoapClient {
    /// Build a new client from config (does NOT log in yet).
    pub fn new(config: &VsphereConfig) -> VmwareResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/sdk", config.base_url()),
            config: config.clone(),
            content: None,
            request_counter: AtomicU64::new(0),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether we have an authenticated session.
    pub fn is_connected(&self) -> bool {
        self.content.is_some()
    }

    /// Service content captured at login.
    pub fn content(&self) -> VmwareResult<&ServiceContent> {
        self.content
            .as_ref()
            .ok_or_else(|| VmwareError::auth("Not logged in, no active SOAP session"))
    }

    // ── Session management ──────────────────────────────────────────

    /// RetrieveServiceContent + SessionManager.Login.
    pub async fn login(&mut self) -> VmwareResult<()> {
        let si = MoRef::new("ServiceInstance", "ServiceInstance");
        let rv = self
            .call(&method_call("RetrieveServiceContent", &si, ""))
            .await?;
        let content = ServiceContent::from_returnval(
            rv.child("returnval")
                .ok_or_else(|| VmwareError::parse("RetrieveServiceContent returned nothing"))?,
        )?;

        debug!(host = %self.config.host, user = %self.config.username, "creating SOAP session");
        let args = format!(
            "<userName>{}</userName><password>{}</password>",
            xml_escape(&self.config.username),
            xml_escape(self.config.password.expose_secret()),
        );
        self.call(&method_call("Login", &content.session_manager, &args))
            .await?;

        self.content = Some(content);
        Ok(())
    }

    /// SessionManager.Logout. Errors are ignored; the session is dropped either way.
    pub async fn logout(&mut self) -> VmwareResult<()> {
        if let Some(content) = self.content.take() {
            if let Err(e) = self
                .call(&method_call("Logout", &content.session_manager, ""))
                .await
            {
                warn!("SOAP logout failed: {e}");
            }
        }
        Ok(())
    }

    // ── Views and property collection ───────────────────────────────

    /// ViewManager.CreateContainerView over the root folder for one type.
    pub async fn create_container_view(&self, kind: &str) -> VmwareResult<MoRef> {
        let content = self.content()?.clone();
        let args = format!(
            "{}<type>{}</type><recursive>true</recursive>",
            moref_xml("container", &content.root_folder),
            xml_escape(kind),
        );
        let resp = self
            .call(&method_call("CreateContainerView", &content.view_manager, &args))
            .await?;
        resp.child("returnval")
            .and_then(XmlNode::moref)
            .ok_or_else(|| VmwareError::parse("CreateContainerView returned no view"))
    }

    /// View.DestroyView.
    pub async fn destroy_view(&self, view: &MoRef) -> VmwareResult<()> {
        self.call(&method_call("DestroyView", view, "")).await?;
        Ok(())
    }

    /// Retrieve `paths` of every `kind` object inside a container view,
    /// following ContinueRetrievePropertiesEx tokens until exhausted.
    pub async fn retrieve_view_properties(
        &self,
        view: &MoRef,
        kind: &str,
        paths: &[&str],
    ) -> VmwareResult<Vec<ObjectContent>> {
        let spec = format!(
            concat!(
                "<specSet>",
                "<propSet><type>{kind}</type>{paths}</propSet>",
                "<objectSet>{obj}<skip>true</skip>",
                r#"<selectSet xsi:type="TraversalSpec">"#,
                "<name>traverseEntities</name><type>ContainerView</type>",
                "<path>view</path><skip>false</skip>",
                "</selectSet></objectSet>",
                "</specSet><options/>",
            ),
            kind = xml_escape(kind),
            paths = path_set_xml(paths),
            obj = moref_xml("obj", view),
        );
        self.retrieve_all(&spec).await
    }

    /// Retrieve `paths` of a single object.
    pub async fn retrieve_object_properties(
        &self,
        obj: &MoRef,
        paths: &[&str],
    ) -> VmwareResult<Option<ObjectContent>> {
        let spec = format!(
            concat!(
                "<specSet>",
                "<propSet><type>{kind}</type>{paths}</propSet>",
                "<objectSet>{obj}<skip>false</skip></objectSet>",
                "</specSet><options/>",
            ),
            kind = xml_escape(&obj.kind),
            paths = path_set_xml(paths),
            obj = moref_xml("obj", obj),
        );
        Ok(self.retrieve_all(&spec).await?.into_iter().next())
    }

    async fn retrieve_all(&self, spec_xml: &str) -> VmwareResult<Vec<ObjectContent>> {
        let pc = self.content()?.property_collector.clone();
        let resp = self
            .call(&method_call("RetrievePropertiesEx", &pc, spec_xml))
            .await?;

        let mut objects = Vec::new();
        let mut token = match resp.child("returnval") {
            Some(rv) => {
                let (objs, token) = parse_retrieve_result(rv);
                objects.extend(objs);
                token
            }
            None => None,
        };

        while let Some(t) = token.take() {
            let args = format!("<token>{}</token>", xml_escape(&t));
            let resp = self
                .call(&method_call("ContinueRetrievePropertiesEx", &pc, &args))
                .await?;
            if let Some(rv) = resp.child("returnval") {
                let (objs, next) = parse_retrieve_result(rv);
                objects.extend(objs);
                token = next;
            }
        }

        Ok(objects)
    }

    // ── HTTP layer ──────────────────────────────────────────────────

    /// Send one method call and return the `<MethodResponse>` element.
    pub async fn call(&self, method_xml: &str) -> VmwareResult<XmlNode> {
        let req_id = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let body = envelope(method_xml);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml; charset=utf-8"));
        headers.insert("SOAPAction", HeaderValue::from_static(SOAP_ACTION));

        debug!(req_id, endpoint = %self.endpoint, bytes = body.len(), "SOAP request");
        if !method_xml.starts_with("<Login ") {
            trace!(req_id, %body, "SOAP request body");
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| VmwareError::parse(format!("Failed to read SOAP response body: {e}")))?;
        trace!(req_id, status = status.as_u16(), bytes = text.len(), "SOAP response");

        // Faults come back as HTTP 500 with a Fault body; prefer the fault text.
        match parse_document(&text) {
            Ok(doc) => match response_body(&doc) {
                Ok(node) if status.is_success() => Ok(node),
                Ok(_) => Err(VmwareError::api(
                    status.as_u16(),
                    format!("SOAP request failed (HTTP {})", status.as_u16()),
                )),
                Err(e) => Err(e),
            },
            Err(_) if !status.is_success() => Err(VmwareError::api(
                status.as_u16(),
                format!("SOAP request failed (HTTP {})", status.as_u16()),
            )),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
  xmlns:xsd="http://www.w3.org/2001/XMLSchema"
  xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
        )
    }

    #[test]
    fn parses_service_content() {
        let xml = wrap(
            r#"<RetrieveServiceContentResponse xmlns="urn:vim25"><returnval>
                <rootFolder type="Folder">group-d1</rootFolder>
                <propertyCollector type="PropertyCollector">propertyCollector</propertyCollector>
                <viewManager type="ViewManager">ViewManager</viewManager>
                <about><name>VMware vCenter Server</name></about>
                <sessionManager type="SessionManager">SessionManager</sessionManager>
            </returnval></RetrieveServiceContentResponse>"#,
        );
        let doc = parse_document(&xml).unwrap();
        let body = response_body(&doc).unwrap();
        assert_eq!(body.name, "RetrieveServiceContentResponse");
        let sc = ServiceContent::from_returnval(body.child("returnval").unwrap()).unwrap();
        assert_eq!(sc.root_folder, MoRef::new("Folder", "group-d1"));
        assert_eq!(sc.session_manager.value, "SessionManager");
    }

    #[test]
    fn parses_property_sets_and_token() {
        let xml = wrap(
            r#"<RetrievePropertiesExResponse xmlns="urn:vim25"><returnval>
              <token>1</token>
              <objects>
                <obj type="HostSystem">host-10</obj>
                <propSet><name>name</name><val xsi:type="xsd:string">esxi01.lab</val></propSet>
                <propSet><name>runtime.connectionState</name>
                  <val xsi:type="HostSystemConnectionState">connected</val></propSet>
                <propSet><name>configManager.graphicsManager</name>
                  <val type="HostGraphicsManager" xsi:type="ManagedObjectReference">graphicsManager-10</val></propSet>
              </objects>
            </returnval></RetrievePropertiesExResponse>"#,
        );
        let body = response_body(&parse_document(&xml).unwrap()).unwrap();
        let (objs, token) = parse_retrieve_result(body.child("returnval").unwrap());
        assert_eq!(token.as_deref(), Some("1"));
        assert_eq!(objs.len(), 1);
        assert_eq!(objs[0].obj, MoRef::new("HostSystem", "host-10"));
        assert_eq!(objs[0].prop_text("name"), Some("esxi01.lab"));
        assert_eq!(
            objs[0].prop("configManager.graphicsManager").and_then(XmlNode::moref),
            Some(MoRef::new("HostGraphicsManager", "graphicsManager-10"))
        );
    }

    #[test]
    fn parses_moref_arrays() {
        let xml = wrap(
            r#"<val xsi:type="ArrayOfManagedObjectReference">
                 <ManagedObjectReference type="HostSystem">host-10</ManagedObjectReference>
                 <ManagedObjectReference type="HostSystem">host-12</ManagedObjectReference>
               </val>"#,
        );
        let val = response_body(&parse_document(&xml).unwrap()).unwrap();
        let refs = moref_array(&val);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].value, "host-12");
    }

    #[test]
    fn host_config_fault_maps_to_config_fault() {
        let xml = wrap(
            r#"<soapenv:Fault>
                <faultcode>ServerFaultCode</faultcode>
                <faultstring>A general system error occurred: graphics device busy</faultstring>
                <detail><HostConfigFaultFault xmlns="urn:vim25" xsi:type="HostConfigFault">
                  <faultMessage><key>k</key><message>busy</message></faultMessage>
                </HostConfigFaultFault></detail>
              </soapenv:Fault>"#,
        );
        let err = response_body(&parse_document(&xml).unwrap()).unwrap_err();
        assert_eq!(err.kind, VmwareErrorKind::ConfigFault);
        assert_eq!(err.message, "A general system error occurred: graphics device busy");
    }

    #[test]
    fn invalid_login_maps_to_auth() {
        let xml = wrap(
            r#"<soapenv:Fault><faultcode>ServerFaultCode</faultcode>
                <faultstring>Cannot complete login due to an incorrect user name or password.</faultstring>
                <detail><InvalidLoginFault xmlns="urn:vim25" xsi:type="InvalidLogin"/></detail>
              </soapenv:Fault>"#,
        );
        let err = response_body(&parse_document(&xml).unwrap()).unwrap_err();
        assert_eq!(err.kind, VmwareErrorKind::AuthenticationError);
    }

    #[test]
    fn fault_without_faultstring_uses_detail_message() {
        let xml = wrap(
            r#"<soapenv:Fault><faultcode>ServerFaultCode</faultcode><faultstring></faultstring>
                <detail><HostConfigFaultFault xsi:type="HostConfigFault">
                  <faultMessage><message>xorg failed to restart</message></faultMessage>
                </HostConfigFaultFault></detail></soapenv:Fault>"#,
        );
        let err = response_body(&parse_document(&xml).unwrap()).unwrap_err();
        assert_eq!(err.message, "xorg failed to restart");
    }

    #[test]
    fn method_call_escapes_arguments() {
        let call = method_call(
            "Login",
            &MoRef::new("SessionManager", "SessionManager"),
            &format!("<password>{}</password>", xml_escape("a<b&c")),
        );
        assert!(call.starts_with(r#"<Login xmlns="urn:vim25"><_this type="SessionManager">SessionManager</_this>"#));
        assert!(call.contains("<password>a&lt;b&amp;c</password>"));
        assert!(envelope(&call).contains("<soapenv:Body><Login"));
    }

    #[test]
    fn unbalanced_document_is_an_error() {
        assert!(parse_document("<a><b></b>").is_err());
    }

    #[test]
    fn soap_client_targets_sdk_endpoint() {
        let cfg = VsphereConfig::new("esx.lab", "root", "pw");
        let client = SoapClient::new(&cfg).unwrap();
        assert_eq!(client.endpoint(), "https://esx.lab:443/sdk");
        assert!(!client.is_connected());
    }
}
