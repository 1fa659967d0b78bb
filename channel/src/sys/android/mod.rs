//! Android backend using JNI.
//!
//! The host activity owns a `com.geokit.channel.LocationBridge` object that
//! wraps the fused location client and the method channel. Rust calls into
//! it for anything that needs a listener or the UI thread:
//!
//! - `requestPermissions([Ljava/lang/String;I)V`
//! - `requestLastLocation(J)V`
//! - `requestLocationUpdates(JIJJI)V` (handle, priority, interval, fastest interval, updates)
//! - `removeLocationUpdates(J)V`
//! - `deliverResult(JLjava/lang/String;)V`
//!
//! and the bridge reports back through the `native*` entry points below,
//! passing the handle it was given. Plain queries go straight to the
//! activity and framework classes.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use futures::channel::oneshot;
use geokit_geocoder::{Address, GeocodeError, Geocoder};
use geokit_location::{
    Location, LocationError, LocationProvider, LocationRequest, Provider, ProviderStatus,
    SettingsError, SettingsLauncher, SubscriptionId, UpdateSink,
};
use geokit_permission::{Permission, PermissionBackend, PermissionError, PermissionStatus};
use jni::objects::{GlobalRef, JClass, JIntArray, JObject, JObjectArray, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jdouble, jint, jlong};
use jni::{JNIEnv, JavaVM};
use log::{debug, error};

use crate::{ChannelConfig, ChannelError, LocationChannel};

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: jint = 0;
/// `Intent.FLAG_ACTIVITY_NEW_TASK`.
const FLAG_ACTIVITY_NEW_TASK: jint = 0x1000_0000;
const ACTION_LOCATION_SOURCE_SETTINGS: &str = "android.settings.LOCATION_SOURCE_SETTINGS";

/// Status constants for `nativeOnLastLocation` (must match Kotlin).
const LAST_LOCATION_OK: jint = 0;
const LAST_LOCATION_SECURITY: jint = 1;

/// The channel type assembled by [`init`].
pub type AndroidChannel =
    LocationChannel<AndroidPlatform, AndroidPlatform, AndroidPlatform, AndroidPlatform>;

/// The platform and the channel built over it, set together by [`init`].
static STATE: OnceLock<(AndroidPlatform, AndroidChannel)> = OnceLock::new();

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

type LastLocationSender = oneshot::Sender<Result<Option<Location>, LocationError>>;

fn last_location_waiters() -> &'static Mutex<HashMap<u64, LastLocationSender>> {
    static WAITERS: OnceLock<Mutex<HashMap<u64, LastLocationSender>>> = OnceLock::new();
    WAITERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn update_sinks() -> &'static Mutex<HashMap<u64, UpdateSink>> {
    static SINKS: OnceLock<Mutex<HashMap<u64, UpdateSink>>> = OnceLock::new();
    SINKS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// How a JNI call failed.
#[derive(Debug)]
enum Failure {
    /// The Java side threw a `SecurityException`.
    Security(String),
    Other(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Security(message) => write!(f, "security exception: {message}"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

impl From<Failure> for LocationError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Security(_) => Self::PermissionDenied,
            Failure::Other(message) => Self::Unexpected(message),
        }
    }
}

/// Platform services backed by the host activity and its location bridge.
#[derive(Clone)]
pub struct AndroidPlatform {
    inner: Arc<Inner>,
}

struct Inner {
    vm: JavaVM,
    activity: GlobalRef,
    bridge: GlobalRef,
    locale: Option<String>,
}

impl fmt::Debug for AndroidPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidPlatform")
            .field("locale", &self.inner.locale)
            .finish_non_exhaustive()
    }
}

impl AndroidPlatform {
    /// Wrap the host activity and its `LocationBridge`.
    ///
    /// # Errors
    /// Returns [`ChannelError::Platform`] if global references cannot be created.
    pub fn new(
        env: &JNIEnv<'_>,
        activity: &JObject<'_>,
        bridge: &JObject<'_>,
        locale: Option<String>,
    ) -> Result<Self, ChannelError> {
        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let activity = env.new_global_ref(activity).map_err(map_jni_error)?;
        let bridge = env.new_global_ref(bridge).map_err(map_jni_error)?;

        Ok(Self {
            inner: Arc::new(Inner {
                vm,
                activity,
                bridge,
                locale,
            }),
        })
    }

    fn with_env<T, F>(&self, action: F) -> Result<T, Failure>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self
            .inner
            .vm
            .attach_current_thread()
            .map_err(|err| Failure::Other(err.to_string()))?;
        let activity = self.inner.activity.as_obj();
        let bridge = self.inner.bridge.as_obj();
        action(&mut env, activity, bridge).map_err(|err| describe_failure(&mut env, &err))
    }

    fn deliver_result(&self, handle: jlong, json: &str) {
        let delivered = self.with_env(|env, _, bridge| {
            let payload = JObject::from(env.new_string(json)?);
            env.call_method(
                bridge,
                "deliverResult",
                "(JLjava/lang/String;)V",
                &[JValue::Long(handle), JValue::Object(&payload)],
            )?;
            Ok(())
        });

        if let Err(err) = delivered {
            error!("failed to deliver method result {handle}: {err}");
        }
    }
}

impl PermissionBackend for AndroidPlatform {
    fn check(&self, permission: Permission) -> PermissionStatus {
        let status = self.with_env(|env, activity, _| {
            let name = JObject::from(env.new_string(permission.manifest_name())?);
            env.call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&name)],
            )?
            .i()
        });

        match status {
            Ok(PERMISSION_GRANTED) => PermissionStatus::Granted,
            Ok(_) => PermissionStatus::Denied,
            Err(err) => {
                error!("failed to check {}: {err}", permission.manifest_name());
                PermissionStatus::NotDetermined
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn request(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        self.with_env(|env, _, bridge| {
            let names =
                env.new_object_array(permissions.len() as jint, "java/lang/String", JObject::null())?;
            for (index, permission) in permissions.iter().enumerate() {
                let name = env.new_string(permission.manifest_name())?;
                env.set_object_array_element(&names, index as jint, name)?;
            }

            let names = JObject::from(names);
            env.call_method(
                bridge,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&names), JValue::Int(request_code)],
            )?;
            Ok(())
        })
        .map_err(|err| PermissionError::Request(err.to_string()))
    }
}

impl ProviderStatus for AndroidPlatform {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        let enabled = self.with_env(|env, activity, _| {
            let service = JObject::from(env.new_string("location")?);
            let manager = env
                .call_method(
                    activity,
                    "getSystemService",
                    "(Ljava/lang/String;)Ljava/lang/Object;",
                    &[JValue::Object(&service)],
                )?
                .l()?;
            let name = JObject::from(env.new_string(provider.name())?);
            env.call_method(
                &manager,
                "isProviderEnabled",
                "(Ljava/lang/String;)Z",
                &[JValue::Object(&name)],
            )?
            .z()
        });

        enabled.unwrap_or_else(|err| {
            error!("failed to query {} provider: {err}", provider.name());
            false
        })
    }
}

impl LocationProvider for AndroidPlatform {
    async fn last_location(&self) -> Result<Option<Location>, LocationError> {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        last_location_waiters()
            .lock()
            .expect("waiter mutex poisoned")
            .insert(handle, tx);

        #[allow(clippy::cast_possible_wrap)]
        let issued = self.with_env(|env, _, bridge| {
            env.call_method(
                bridge,
                "requestLastLocation",
                "(J)V",
                &[JValue::Long(handle as jlong)],
            )?;
            Ok(())
        });

        if let Err(err) = issued {
            last_location_waiters()
                .lock()
                .expect("waiter mutex poisoned")
                .remove(&handle);
            return Err(err.into());
        }

        rx.await.unwrap_or_else(|_| {
            Err(LocationError::Provider(
                "last location request was dropped".into(),
            ))
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn request_location_updates(
        &self,
        request: &LocationRequest,
        sink: UpdateSink,
    ) -> Result<SubscriptionId, LocationError> {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        update_sinks()
            .lock()
            .expect("sink map mutex poisoned")
            .insert(handle, sink);

        let issued = self.with_env(|env, _, bridge| {
            env.call_method(
                bridge,
                "requestLocationUpdates",
                "(JIJJI)V",
                &[
                    JValue::Long(handle as jlong),
                    JValue::Int(request.priority.code()),
                    JValue::Long(request.interval_ms as jlong),
                    JValue::Long(request.fastest_interval_ms as jlong),
                    JValue::Int(request.num_updates as jint),
                ],
            )?;
            Ok(())
        });

        match issued {
            Ok(()) => Ok(SubscriptionId(handle)),
            Err(err) => {
                update_sinks()
                    .lock()
                    .expect("sink map mutex poisoned")
                    .remove(&handle);
                Err(err.into())
            }
        }
    }

    fn remove_location_updates(&self, subscription: SubscriptionId) {
        update_sinks()
            .lock()
            .expect("sink map mutex poisoned")
            .remove(&subscription.0);

        #[allow(clippy::cast_possible_wrap)]
        let removed = self.with_env(|env, _, bridge| {
            env.call_method(
                bridge,
                "removeLocationUpdates",
                "(J)V",
                &[JValue::Long(subscription.0 as jlong)],
            )?;
            Ok(())
        });

        if let Err(err) = removed {
            error!("failed to remove location updates {}: {err}", subscription.0);
        }
    }
}

impl Geocoder for AndroidPlatform {
    fn is_present(&self) -> bool {
        self.with_env(|env, _, _| {
            env.call_static_method("android/location/Geocoder", "isPresent", "()Z", &[])?
                .z()
        })
        .unwrap_or(false)
    }

    // Geocoder.getFromLocation blocks on network I/O; callers run on a worker thread.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    async fn from_location(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> Result<Vec<Address>, GeocodeError> {
        self.with_env(|env, activity, _| {
            let locale = match &self.inner.locale {
                Some(tag) => {
                    let tag = JObject::from(env.new_string(tag)?);
                    env.call_static_method(
                        "java/util/Locale",
                        "forLanguageTag",
                        "(Ljava/lang/String;)Ljava/util/Locale;",
                        &[JValue::Object(&tag)],
                    )?
                    .l()?
                }
                None => env
                    .call_static_method("java/util/Locale", "getDefault", "()Ljava/util/Locale;", &[])?
                    .l()?,
            };

            let geocoder = env.new_object(
                "android/location/Geocoder",
                "(Landroid/content/Context;Ljava/util/Locale;)V",
                &[JValue::Object(activity), JValue::Object(&locale)],
            )?;
            let list = env
                .call_method(
                    &geocoder,
                    "getFromLocation",
                    "(DDI)Ljava/util/List;",
                    &[
                        JValue::Double(latitude),
                        JValue::Double(longitude),
                        JValue::Int(max_results as jint),
                    ],
                )?
                .l()?;
            if list.is_null() {
                return Ok(Vec::new());
            }

            let size = env.call_method(&list, "size", "()I", &[])?.i()?;
            let mut addresses = Vec::new();
            for index in 0..size {
                let address = env
                    .call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
                    .l()?;
                addresses.push(read_address(env, &address)?);
                env.delete_local_ref(address)?;
            }
            Ok(addresses)
        })
        .map_err(|err| GeocodeError::Platform(err.to_string()))
    }
}

impl SettingsLauncher for AndroidPlatform {
    fn open_location_settings(&self) -> Result<(), SettingsError> {
        self.with_env(|env, activity, _| {
            let action = JObject::from(env.new_string(ACTION_LOCATION_SOURCE_SETTINGS)?);
            let intent = env.new_object(
                "android/content/Intent",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&action)],
            )?;
            env.call_method(
                &intent,
                "setFlags",
                "(I)Landroid/content/Intent;",
                &[JValue::Int(FLAG_ACTIVITY_NEW_TASK)],
            )?;
            env.call_method(
                activity,
                "startActivity",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&intent)],
            )?;
            Ok(())
        })
        .map_err(|err| SettingsError(err.to_string()))
    }
}

/// Build the channel for the host activity. Calling it again is a no-op.
///
/// `config` is a JSON [`ChannelConfig`]; a null string selects the defaults.
///
/// # Errors
/// Returns a [`ChannelError`] if the configuration is invalid or JNI
/// references cannot be created.
pub fn init(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    bridge: &JObject<'_>,
    config: &JString<'_>,
) -> Result<(), ChannelError> {
    if STATE.get().is_some() {
        return Ok(());
    }

    let config = if config.is_null() {
        ChannelConfig::default()
    } else {
        let json: String = env.get_string(config).map_err(map_jni_error)?.into();
        ChannelConfig::from_json(&json)?
    };

    let platform = AndroidPlatform::new(env, activity, bridge, config.geocoder_locale.clone())?;
    let channel = LocationChannel::new(
        config,
        platform.clone(),
        platform.clone(),
        platform.clone(),
        platform.clone(),
    );

    // A concurrent init may have won; its pair stays and this one is dropped.
    let _ = STATE.set((platform, channel));
    Ok(())
}

/// The channel built by [`init`].
///
/// # Errors
/// Returns [`ChannelError::NotInitialized`] before [`init`] has succeeded.
pub fn channel() -> Result<&'static AndroidChannel, ChannelError> {
    STATE
        .get()
        .map(|(_, channel)| channel)
        .ok_or(ChannelError::NotInitialized)
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_geokit_channel_LocationBridge_nativeInit(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    activity: JObject<'_>,
    bridge: JObject<'_>,
    config: JString<'_>,
) -> jboolean {
    match init(&mut env, &activity, &bridge, &config) {
        Ok(()) => JNI_TRUE,
        Err(err) => {
            error!("failed to initialize location channel: {err}");
            JNI_FALSE
        }
    }
}

/// Accept a JSON call envelope and answer it on a worker thread.
///
/// Returns `false` if the call cannot be accepted (unreadable payload, or
/// `nativeInit` has not run); the host must then fail the call itself.
/// Otherwise exactly one result envelope is handed to
/// `LocationBridge.deliverResult` under the same handle.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_geokit_channel_LocationBridge_nativeHandleMethodCall(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    payload: JString<'_>,
) -> jboolean {
    let payload: String = match env.get_string(&payload) {
        Ok(value) => value.into(),
        Err(err) => {
            error!("failed to read method call payload {handle}: {err}");
            return JNI_FALSE;
        }
    };

    let Some((platform, dispatcher)) = STATE.get() else {
        error!("method call {handle} arrived before nativeInit");
        return JNI_FALSE;
    };

    std::thread::spawn(move || {
        let reply = futures::executor::block_on(dispatcher.handle_json(&payload));
        platform.deliver_result(handle, &reply);
    });
    JNI_TRUE
}

#[allow(non_snake_case, clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_geokit_channel_LocationBridge_nativeOnLastLocation(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    status: jint,
    found: jboolean,
    latitude: jdouble,
    longitude: jdouble,
    message: JString<'_>,
) {
    #[allow(clippy::cast_sign_loss)]
    let handle = handle as u64;
    let result = match status {
        LAST_LOCATION_OK => Ok((found == JNI_TRUE).then(|| Location::new(latitude, longitude))),
        LAST_LOCATION_SECURITY => Err(LocationError::PermissionDenied),
        _ => {
            let message = read_string(&mut env, JObject::from(message))
                .ok()
                .flatten()
                .unwrap_or_default();
            Err(LocationError::Provider(message))
        }
    };

    let waiter = last_location_waiters()
        .lock()
        .expect("waiter mutex poisoned")
        .remove(&handle);
    match waiter {
        Some(waiter) => {
            let _ = waiter.send(result);
        }
        None => error!("received last location for unknown handle {handle}"),
    }
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_geokit_channel_LocationBridge_nativeOnLocationResult(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    found: jboolean,
    latitude: jdouble,
    longitude: jdouble,
) {
    #[allow(clippy::cast_sign_loss)]
    let handle = handle as u64;
    let sink = update_sinks()
        .lock()
        .expect("sink map mutex poisoned")
        .get(&handle)
        .cloned();

    match sink {
        Some(sink) => {
            sink.deliver((found == JNI_TRUE).then(|| Location::new(latitude, longitude)));
        }
        None => debug!("ignoring location update for released subscription {handle}"),
    }
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_geokit_channel_LocationBridge_nativeOnPermissionResult(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    request_code: jint,
    permissions: JObjectArray<'_>,
    grant_results: JIntArray<'_>,
) {
    let grants = match read_grants(&mut env, &permissions, &grant_results) {
        Ok(grants) => grants,
        Err(err) => {
            error!("failed to read permission result {request_code}: {err}");
            Vec::new()
        }
    };

    match channel() {
        Ok(channel) => {
            channel.on_permission_result(request_code, grants);
        }
        Err(err) => error!("permission result {request_code} dropped: {err}"),
    }
}

#[allow(clippy::cast_sign_loss)]
fn read_grants(
    env: &mut JNIEnv<'_>,
    permissions: &JObjectArray<'_>,
    grant_results: &JIntArray<'_>,
) -> jni::errors::Result<Vec<(Permission, PermissionStatus)>> {
    let count = env
        .get_array_length(permissions)?
        .min(env.get_array_length(grant_results)?);
    let mut results = vec![0; count as usize];
    env.get_int_array_region(grant_results, 0, &mut results)?;

    let mut grants = Vec::new();
    for (index, result) in (0..count).zip(results) {
        let name = env.get_object_array_element(permissions, index)?;
        let Some(permission) = read_string(env, name)?
            .as_deref()
            .and_then(Permission::from_manifest_name)
        else {
            continue;
        };
        let status = if result == PERMISSION_GRANTED {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        grants.push((permission, status));
    }
    Ok(grants)
}

fn read_address(env: &mut JNIEnv<'_>, address: &JObject<'_>) -> jni::errors::Result<Address> {
    Ok(Address {
        thoroughfare: string_getter(env, address, "getThoroughfare")?,
        locality: string_getter(env, address, "getLocality")?,
        admin_area: string_getter(env, address, "getAdminArea")?,
        country_name: string_getter(env, address, "getCountryName")?,
    })
}

fn string_getter(
    env: &mut JNIEnv<'_>,
    object: &JObject<'_>,
    getter: &str,
) -> jni::errors::Result<Option<String>> {
    let value = env
        .call_method(object, getter, "()Ljava/lang/String;", &[])?
        .l()?;
    read_string(env, value)
}

fn read_string(env: &mut JNIEnv<'_>, value: JObject<'_>) -> jni::errors::Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let value = JString::from(value);
    let text: String = env.get_string(&value)?.into();
    Ok(Some(text))
}

/// Clear a pending Java exception and classify it.
fn describe_failure(env: &mut JNIEnv<'_>, err: &jni::errors::Error) -> Failure {
    if !matches!(err, jni::errors::Error::JavaException) {
        return Failure::Other(err.to_string());
    }

    let Ok(throwable) = env.exception_occurred() else {
        return Failure::Other(err.to_string());
    };
    let _ = env.exception_clear();

    let message = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l())
        .and_then(|value| read_string(env, value))
        .ok()
        .flatten()
        .unwrap_or_else(|| err.to_string());

    if env
        .is_instance_of(&throwable, "java/lang/SecurityException")
        .unwrap_or(false)
    {
        Failure::Security(message)
    } else {
        Failure::Other(message)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> ChannelError {
    ChannelError::Platform(err.to_string())
}
